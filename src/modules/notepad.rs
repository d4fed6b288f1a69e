//! Notepad - plain text editor with open/save through the worker.

use std::path::{Path, PathBuf};

use eframe::egui;

use super::path_prompt::{PathPrompt, PromptOutcome};
use super::AI_CHAT;
use crate::bus::{topics, BusMessage};
use crate::error::{ModuleError, ModuleMountError};
use crate::module::{FeatureModule, ModuleContext};
use crate::protocol::{BackendEvent, TaskId};

/// Something the user asked for that would throw away unsaved edits.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Discarding {
    New,
    PromptOpen,
    OpenPath(PathBuf),
}

/// Answer to the unsaved-changes question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmChoice {
    Save,
    Discard,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptKind {
    Open,
    SaveAs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingIo {
    Load(TaskId),
    Save(TaskId),
}

#[derive(Debug, Default)]
pub struct Notepad {
    text: String,
    current_file: Option<PathBuf>,
    modified: bool,
    mounted: bool,
    prompt: Option<(PromptKind, PathPrompt)>,
    confirm: Option<Discarding>,
    pending_io: Option<PendingIo>,
    /// Runs once the save in flight succeeds.
    after_save: Option<Discarding>,
    /// A `text.open` that arrived while hidden; loaded on the next mount.
    deferred_open: Option<PathBuf>,
    error: Option<String>,
}

impl Notepad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.modified = true;
    }

    pub fn current_file(&self) -> Option<&Path> {
        self.current_file.as_deref()
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn is_busy(&self) -> bool {
        self.pending_io.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn awaiting_confirmation(&self) -> bool {
        self.confirm.is_some()
    }

    /// "Untitled" or the file name, with a `*` while modified.
    pub fn title(&self) -> String {
        let name = self
            .current_file
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string());
        if self.modified {
            format!("{name} *")
        } else {
            name
        }
    }

    pub fn new_document(&mut self, cx: &mut ModuleContext<'_>) {
        self.guard(Discarding::New, cx);
    }

    pub fn request_open(&mut self, cx: &mut ModuleContext<'_>) {
        self.guard(Discarding::PromptOpen, cx);
    }

    pub fn open_path(&mut self, path: PathBuf, cx: &mut ModuleContext<'_>) {
        self.guard(Discarding::OpenPath(path), cx);
    }

    /// Save to the current file, or ask for a path if there is none.
    pub fn save(&mut self, cx: &mut ModuleContext<'_>) {
        match self.current_file.clone() {
            Some(path) => self.save_as(path, cx),
            None => self.prompt = Some((PromptKind::SaveAs, PathPrompt::new("Save", "notes.txt"))),
        }
    }

    pub fn save_as(&mut self, path: PathBuf, cx: &mut ModuleContext<'_>) {
        if self.pending_io.is_some() {
            return;
        }
        self.error = None;
        let task = cx.save_file(path, self.text.clone().into_bytes());
        self.pending_io = Some(PendingIo::Save(task));
    }

    pub fn resolve_confirm(&mut self, choice: ConfirmChoice, cx: &mut ModuleContext<'_>) {
        let Some(intent) = self.confirm.take() else {
            return;
        };
        match choice {
            ConfirmChoice::Save => {
                self.after_save = Some(intent);
                self.save(cx);
            }
            ConfirmChoice::Discard => self.perform(intent, cx),
            ConfirmChoice::Cancel => {}
        }
    }

    /// Hand the current text to the chat module and switch to it.
    pub fn send_to_chat(&self, cx: &mut ModuleContext<'_>) {
        let text = self.text.trim();
        if text.is_empty() {
            return;
        }
        cx.publish(BusMessage::activate(AI_CHAT));
        cx.publish(BusMessage::new(topics::CHAT_PROMPT, text.to_string()));
    }

    fn guard(&mut self, intent: Discarding, cx: &mut ModuleContext<'_>) {
        if self.modified {
            self.confirm = Some(intent);
        } else {
            self.perform(intent, cx);
        }
    }

    fn perform(&mut self, intent: Discarding, cx: &mut ModuleContext<'_>) {
        match intent {
            Discarding::New => {
                self.text.clear();
                self.current_file = None;
                self.modified = false;
                self.error = None;
            }
            Discarding::PromptOpen => {
                self.prompt = Some((PromptKind::Open, PathPrompt::new("Open", "notes.txt")));
            }
            Discarding::OpenPath(path) => {
                if self.pending_io.is_some() {
                    return;
                }
                self.error = None;
                self.pending_io = Some(PendingIo::Load(cx.load_file(path)));
            }
        }
    }

    fn submit_prompt(&mut self, kind: PromptKind, path: PathBuf, cx: &mut ModuleContext<'_>) {
        match kind {
            // Confirmation already happened before the prompt was shown
            PromptKind::Open => self.perform(Discarding::OpenPath(path), cx),
            PromptKind::SaveAs => self.save_as(path, cx),
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui, cx: &mut ModuleContext<'_>) {
        let idle = self.pending_io.is_none() && self.confirm.is_none();
        ui.horizontal(|ui| {
            if ui.add_enabled(idle, egui::Button::new("New")).clicked() {
                self.new_document(cx);
            }
            if ui.add_enabled(idle, egui::Button::new("Open…")).clicked() {
                self.request_open(cx);
            }
            if ui.add_enabled(idle, egui::Button::new("Save")).clicked() {
                self.save(cx);
            }
            if ui.add_enabled(idle, egui::Button::new("Save As…")).clicked() {
                let input = self
                    .current_file
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                self.prompt = Some((
                    PromptKind::SaveAs,
                    PathPrompt::new("Save", "notes.txt").with_input(input),
                ));
            }
            ui.separator();
            let has_text = !self.text.trim().is_empty();
            if ui
                .add_enabled(has_text, egui::Button::new("Send to AI chat"))
                .on_hover_text("Open the chat with this text as the prompt")
                .clicked()
            {
                self.send_to_chat(cx);
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if self.pending_io.is_some() {
                    ui.spinner();
                }
                ui.label(egui::RichText::new(self.title()).strong());
            });
        });
    }
}

impl FeatureModule for Notepad {
    fn mount(&mut self, cx: &mut ModuleContext<'_>) -> Result<(), ModuleMountError> {
        self.mounted = true;
        if let Some(path) = self.deferred_open.take() {
            self.open_path(path, cx);
        }
        Ok(())
    }

    fn unmount(&mut self, _cx: &mut ModuleContext<'_>) {
        self.mounted = false;
        // The shell cancels our tasks; their results never arrive
        self.pending_io = None;
        self.after_save = None;
        self.prompt = None;
    }

    fn on_message(
        &mut self,
        message: &BusMessage,
        cx: &mut ModuleContext<'_>,
    ) -> Result<(), ModuleError> {
        if !message.is(topics::TEXT_OPEN) {
            return Ok(());
        }
        let path = message.expect_payload::<PathBuf>()?.clone();
        if self.mounted {
            self.open_path(path, cx);
        } else {
            self.deferred_open = Some(path);
        }
        Ok(())
    }

    fn on_task_event(&mut self, event: BackendEvent, cx: &mut ModuleContext<'_>) {
        match event {
            BackendEvent::FileLoaded { task, path, result } => {
                if self.pending_io != Some(PendingIo::Load(task)) {
                    return;
                }
                self.pending_io = None;
                match result.map(String::from_utf8) {
                    Ok(Ok(text)) => {
                        self.text = text;
                        self.current_file = Some(path);
                        self.modified = false;
                    }
                    Ok(Err(err)) => {
                        // Buffer and path stay as they were so a save cannot clobber the file
                        tracing::warn!(path = %path.display(), "not valid UTF-8: {}", err.utf8_error());
                        let message = format!("{} is not UTF-8 text and was not opened", path.display());
                        cx.notify(message.clone());
                        self.error = Some(message);
                    }
                    Err(err) => self.error = Some(err.to_string()),
                }
            }
            BackendEvent::FileSaved { task, path, result } => {
                if self.pending_io != Some(PendingIo::Save(task)) {
                    return;
                }
                self.pending_io = None;
                match result {
                    Ok(()) => {
                        cx.notify(format!("Saved {}", path.display()));
                        self.current_file = Some(path);
                        self.modified = false;
                        if let Some(intent) = self.after_save.take() {
                            self.perform(intent, cx);
                        }
                    }
                    Err(err) => {
                        self.after_save = None;
                        self.error = Some(err.to_string());
                    }
                }
            }
            _ => {}
        }
    }

    fn has_unsaved_changes(&self) -> bool {
        self.modified
    }

    fn ui(&mut self, ui: &mut egui::Ui, cx: &mut ModuleContext<'_>) {
        self.toolbar(ui, cx);

        if let Some((kind, prompt)) = self.prompt.as_mut() {
            let kind = *kind;
            match prompt.show(ui) {
                Some(PromptOutcome::Submit(path)) => {
                    self.prompt = None;
                    self.submit_prompt(kind, path, cx);
                }
                Some(PromptOutcome::Cancel) => {
                    self.prompt = None;
                    self.after_save = None;
                }
                None => {}
            }
        }

        if self.confirm.is_some() {
            let mut choice = None;
            ui.horizontal(|ui| {
                ui.colored_label(egui::Color32::YELLOW, "You have unsaved changes.");
                if ui.button("Save").clicked() {
                    choice = Some(ConfirmChoice::Save);
                }
                if ui.button("Discard").clicked() {
                    choice = Some(ConfirmChoice::Discard);
                }
                if ui.button("Cancel").clicked() {
                    choice = Some(ConfirmChoice::Cancel);
                }
            });
            if let Some(choice) = choice {
                self.resolve_confirm(choice, cx);
            }
        }

        if let Some(error) = self.error.clone() {
            ui.horizontal(|ui| {
                ui.colored_label(egui::Color32::from_rgb(230, 80, 80), error);
                if ui.small_button("✕").clicked() {
                    self.error = None;
                }
            });
        }

        ui.separator();
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let editor = egui::TextEdit::multiline(&mut self.text)
                    .font(egui::TextStyle::Monospace)
                    .desired_width(f32::INFINITY)
                    .desired_rows(24)
                    .interactive(!matches!(self.pending_io, Some(PendingIo::Load(_))));
                if ui.add(editor).changed() {
                    self.modified = true;
                }
            });
    }
}
