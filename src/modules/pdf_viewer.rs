//! PDF viewer.
//!
//! egui has no PDF renderer, so the module inspects the document (header,
//! version, page count) and hands rendering to the system viewer.

use std::path::{Path, PathBuf};

use eframe::egui;

use super::path_prompt::{PathPrompt, PromptOutcome};
use crate::bus::{topics, BusMessage};
use crate::error::{ModuleError, ModuleMountError};
use crate::media::PdfInfo;
use crate::module::{FeatureModule, ModuleContext};
use crate::protocol::{BackendEvent, TaskId};

fn human_size(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KIB {
        format!("{bytes} B")
    } else if b < KIB * KIB {
        format!("{:.1} KiB", b / KIB)
    } else {
        format!("{:.1} MiB", b / (KIB * KIB))
    }
}

#[derive(Debug, Default)]
pub struct PdfViewer {
    document: Option<(PathBuf, PdfInfo)>,
    mounted: bool,
    prompt: Option<PathPrompt>,
    loading: Option<TaskId>,
    deferred_open: Option<PathBuf>,
    error: Option<String>,
}

impl PdfViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> Option<(&Path, &PdfInfo)> {
        self.document.as_ref().map(|(p, i)| (p.as_path(), i))
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn open_path(&mut self, path: PathBuf, cx: &mut ModuleContext<'_>) {
        if self.loading.is_some() {
            return;
        }
        self.error = None;
        self.loading = Some(cx.inspect_pdf(path));
    }

    fn open_externally(&mut self, cx: &mut ModuleContext<'_>) {
        let Some((path, _)) = &self.document else {
            return;
        };
        match open::that_detached(path) {
            Ok(()) => cx.notify(format!("Opened {} in the system viewer", path.display())),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "system viewer failed");
                self.error = Some(format!("Could not open the system viewer: {err}"));
            }
        }
    }
}

impl FeatureModule for PdfViewer {
    fn mount(&mut self, cx: &mut ModuleContext<'_>) -> Result<(), ModuleMountError> {
        self.mounted = true;
        if let Some(path) = self.deferred_open.take() {
            self.open_path(path, cx);
        }
        Ok(())
    }

    fn unmount(&mut self, _cx: &mut ModuleContext<'_>) {
        self.mounted = false;
        self.loading = None;
    }

    fn on_message(
        &mut self,
        message: &BusMessage,
        cx: &mut ModuleContext<'_>,
    ) -> Result<(), ModuleError> {
        if !message.is(topics::PDF_OPEN) {
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

    fn on_task_event(&mut self, event: BackendEvent, _cx: &mut ModuleContext<'_>) {
        let BackendEvent::PdfInspected { task, path, result } = event else {
            return;
        };
        if self.loading != Some(task) {
            return;
        }
        self.loading = None;
        match result {
            Ok(info) => self.document = Some((path, info)),
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    fn ui(&mut self, ui: &mut egui::Ui, cx: &mut ModuleContext<'_>) {
        ui.horizontal(|ui| {
            if ui
                .add_enabled(self.loading.is_none(), egui::Button::new("Open PDF…"))
                .clicked()
            {
                self.prompt = Some(PathPrompt::new("Open", "document.pdf"));
            }
            if ui
                .add_enabled(self.document.is_some(), egui::Button::new("Open in system viewer"))
                .clicked()
            {
                self.open_externally(cx);
            }
            if self.loading.is_some() {
                ui.spinner();
            }
        });

        if let Some(prompt) = self.prompt.as_mut() {
            match prompt.show(ui) {
                Some(PromptOutcome::Submit(path)) => {
                    self.prompt = None;
                    self.open_path(path, cx);
                }
                Some(PromptOutcome::Cancel) => self.prompt = None,
                None => {}
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
        match &self.document {
            Some((path, info)) => {
                egui::Grid::new("pdf_info")
                    .num_columns(2)
                    .spacing([24.0, 6.0])
                    .show(ui, |ui| {
                        ui.strong("File");
                        ui.label(path.display().to_string());
                        ui.end_row();
                        ui.strong("PDF version");
                        ui.label(&info.version);
                        ui.end_row();
                        ui.strong("Pages");
                        ui.label(info.pages.to_string());
                        ui.end_row();
                        ui.strong("Size");
                        ui.label(human_size(info.size_bytes));
                        ui.end_row();
                    });
            }
            None => {
                ui.centered_and_justified(|ui| {
                    ui.weak("Click \"Open PDF…\" to choose a document.");
                });
            }
        }
    }
}

/// Whether `path` looks like a PDF by extension.
pub fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}
