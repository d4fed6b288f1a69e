//! Menu bar, navigation panel, and the central display area

use eframe::egui;

use crate::app::DeskApp;
use crate::modules::open_file_messages;
use crate::modules::path_prompt::{PathPrompt, PromptOutcome};
use crate::ui;
use crate::ui::menu::{MenuAction, MenuEntry};

impl DeskApp {
    /// Render the menu bar at the top of the window
    pub(in crate::app) fn render_menu_bar(&mut self, ctx: &egui::Context) {
        let theme = self.theme();

        let action = egui::TopBottomPanel::top("menu_bar")
            .frame(
                egui::Frame::new()
                    .fill(theme.surface[1])
                    .inner_margin(egui::Margin::symmetric(8, 4))
                    .stroke(egui::Stroke::new(1.0, theme.border)),
            )
            .show(ctx, |ui| {
                let entries: Vec<MenuEntry<'_>> = self
                    .shell
                    .registry()
                    .list()
                    .iter()
                    .map(|d| MenuEntry {
                        id: d.id(),
                        label: d.label(),
                    })
                    .collect();
                ui::menu::render_menu_bar(
                    ctx,
                    ui,
                    &entries,
                    self.shell.active_module(),
                    &self.shortcuts,
                    &mut self.show_navigation,
                )
            })
            .inner;

        match action {
            Some(MenuAction::OpenFile) => {
                self.shell.go_home();
                self.open_prompt = Some(PathPrompt::new("Open", "/path/to/file"));
            }
            Some(MenuAction::Select(id)) => self.select_module(&id),
            Some(MenuAction::Home) => self.shell.go_home(),
            Some(MenuAction::Settings) => self.dialogs.open_settings(&self.settings),
            Some(MenuAction::Shortcuts) => self.show_shortcuts_help = true,
            Some(MenuAction::About) => self.dialogs.show_about(),
            None => {}
        }
    }

    /// Left side panel: one entry per registered module
    pub(in crate::app) fn render_navigation(&mut self, ctx: &egui::Context) {
        let theme = self.theme();
        let mut clicked: Option<Option<String>> = None;

        egui::SidePanel::left("navigation")
            .resizable(false)
            .exact_width(180.0)
            .frame(
                egui::Frame::new()
                    .fill(theme.surface[1])
                    .inner_margin(egui::Margin::symmetric(8, 12))
                    .stroke(egui::Stroke::new(1.0, theme.border)),
            )
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new("MODULES")
                        .small()
                        .strong()
                        .color(theme.text_muted),
                );
                ui.add_space(6.0);

                let home_active = self.shell.active_module().is_none();
                if ui
                    .add_sized(
                        [ui.available_width(), 28.0],
                        egui::SelectableLabel::new(home_active, "🏠 Home"),
                    )
                    .clicked()
                {
                    clicked = Some(None);
                }

                for descriptor in self.shell.registry().list() {
                    let active = self.shell.state().is_active(descriptor.id());
                    let response = ui.add_sized(
                        [ui.available_width(), 28.0],
                        egui::SelectableLabel::new(active, descriptor.label()),
                    );
                    if response.clicked() {
                        clicked = Some(Some(descriptor.id().to_string()));
                    }
                }
            });

        match clicked {
            Some(Some(id)) => self.select_module(&id),
            Some(None) => self.shell.go_home(),
            None => {}
        }
    }

    /// Render the display area: the active module, a mount error, or home
    pub(in crate::app) fn render_central_panel(&mut self, ctx: &egui::Context) {
        let theme = self.theme();
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(theme.surface[0]).inner_margin(12.0))
            .show(ctx, |ui| {
                if let Some(err) = self.shell.mount_error().cloned() {
                    egui::Frame::new()
                        .fill(theme.error.linear_multiply(0.15))
                        .stroke(egui::Stroke::new(1.0, theme.error))
                        .corner_radius(6.0)
                        .inner_margin(12.0)
                        .show(ui, |ui| {
                            ui.colored_label(theme.error, egui::RichText::new("⚠ Could not open module").strong());
                            ui.label(err.to_string());
                            if ui.button("Dismiss").clicked() {
                                self.shell.dismiss_mount_error();
                            }
                        });
                    ui.add_space(12.0);
                }

                if !self.shell.render_active(ui) {
                    self.render_home(ui);
                }
            });
    }

    fn render_home(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.heading("Welcome to deskhub");
            ui.label("Pick a module on the left, or open a file.");
            ui.add_space(16.0);
        });

        let labels: Vec<(String, String)> = self
            .shell
            .registry()
            .list()
            .iter()
            .map(|d| (d.id().to_string(), d.label()))
            .collect();
        let mut selected = None;
        ui.vertical_centered(|ui| {
            ui.horizontal_wrapped(|ui| {
                for (id, label) in &labels {
                    if ui.button(label).clicked() {
                        selected = Some(id.clone());
                    }
                }
                if ui.button("📂 Open file…").clicked() {
                    self.open_prompt = Some(PathPrompt::new("Open", "/path/to/file"));
                }
            });
        });
        if let Some(id) = selected {
            self.select_module(&id);
            return;
        }

        let mut submitted = None;
        if let Some(prompt) = self.open_prompt.as_mut() {
            ui.add_space(12.0);
            match prompt.show(ui) {
                Some(PromptOutcome::Submit(path)) => submitted = Some(path),
                Some(PromptOutcome::Cancel) => self.open_prompt = None,
                None => {}
            }
        }
        if let Some(path) = submitted {
            self.open_prompt = None;
            for message in open_file_messages(&path) {
                self.shell.publish(message);
            }
        }
    }
}
