//! Settings dialog (Ctrl+,) - AI backend, module retention and theme.

use eframe::egui;

use super::DialogAction;
use crate::config::{RetentionPolicy, Settings};

/// Self-contained settings dialog state. Edits a copy; nothing is applied
/// until the user saves.
pub struct SettingsDialog {
    draft: Settings,
    api_key_input: String,
    original_api_key: String,
    show_key: bool,
}

impl SettingsDialog {
    pub fn new(current: &Settings) -> Self {
        let key = current.ai.api_key.clone().unwrap_or_default();
        Self {
            draft: current.clone(),
            api_key_input: key.clone(),
            original_api_key: key,
            show_key: false,
        }
    }

    /// The edited settings plus whether the API key field was touched.
    fn submit(&self) -> DialogAction {
        let mut settings = self.draft.clone();
        let key = self.api_key_input.trim();
        settings.ai.api_key = (!key.is_empty()).then(|| key.to_string());
        if settings.ai.model.trim().is_empty() {
            settings.ai.model = crate::config::DEFAULT_MODEL.to_string();
        }
        if settings.ai.base_url.trim().is_empty() {
            settings.ai.base_url = crate::config::DEFAULT_API_BASE.to_string();
        }
        DialogAction::SaveSettings {
            settings,
            api_key_changed: self.api_key_input.trim() != self.original_api_key.trim(),
        }
    }

    /// Render the dialog. Returns the action (if any) and whether it is still open.
    pub fn render(&mut self, ctx: &egui::Context) -> (Option<DialogAction>, bool) {
        let mut action = None;
        let mut still_open = true;
        let mut close = false;

        egui::Window::new("Settings")
            .open(&mut still_open)
            .resizable(false)
            .collapsible(false)
            .default_width(420.0)
            .show(ctx, |ui| {
                ui.heading("AI assistant");
                egui::Grid::new("settings_ai")
                    .num_columns(2)
                    .spacing([12.0, 8.0])
                    .show(ui, |ui| {
                        ui.label("API key:");
                        ui.horizontal(|ui| {
                            ui.add(
                                egui::TextEdit::singleline(&mut self.api_key_input)
                                    .password(!self.show_key)
                                    .desired_width(240.0)
                                    .hint_text("sk-…"),
                            );
                            ui.checkbox(&mut self.show_key, "Show");
                        });
                        ui.end_row();

                        ui.label("Model:");
                        ui.add(
                            egui::TextEdit::singleline(&mut self.draft.ai.model)
                                .desired_width(240.0),
                        );
                        ui.end_row();

                        ui.label("API base URL:");
                        ui.add(
                            egui::TextEdit::singleline(&mut self.draft.ai.base_url)
                                .desired_width(240.0),
                        );
                        ui.end_row();
                    });
                ui.label(
                    egui::RichText::new("The key is kept in the system keyring, not in the settings file.")
                        .weak()
                        .small(),
                );

                ui.add_space(8.0);
                ui.separator();
                ui.heading("Modules");
                ui.radio_value(
                    &mut self.draft.retention,
                    RetentionPolicy::Recreate,
                    "Start modules fresh each time they are opened",
                );
                ui.radio_value(
                    &mut self.draft.retention,
                    RetentionPolicy::KeepAlive,
                    "Keep modules alive in the background",
                );

                ui.add_space(8.0);
                ui.separator();
                ui.heading("Appearance");
                ui.horizontal(|ui| {
                    ui.selectable_value(&mut self.draft.theme, "dark".to_string(), "🌙 Dark");
                    ui.selectable_value(&mut self.draft.theme, "light".to_string(), "☀ Light");
                });

                ui.add_space(12.0);
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        action = Some(self.submit());
                        close = true;
                    }
                    if ui.button("Cancel").clicked() {
                        close = true;
                    }
                });

                if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                    close = true;
                }
            });

        (action, still_open && !close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untouched_key_is_not_reported_changed() {
        let mut settings = Settings::default();
        settings.ai.api_key = Some("sk-old".into());
        let dialog = SettingsDialog::new(&settings);

        let DialogAction::SaveSettings { settings, api_key_changed } = dialog.submit();
        assert!(!api_key_changed);
        assert_eq!(settings.ai.api_key.as_deref(), Some("sk-old"));
    }

    #[test]
    fn test_cleared_key_and_blank_fields() {
        let mut settings = Settings::default();
        settings.ai.api_key = Some("sk-old".into());
        let mut dialog = SettingsDialog::new(&settings);
        dialog.api_key_input = "   ".into();
        dialog.draft.ai.model.clear();
        dialog.draft.retention = RetentionPolicy::KeepAlive;

        let DialogAction::SaveSettings { settings, api_key_changed } = dialog.submit();
        assert!(api_key_changed);
        assert!(settings.ai.api_key.is_none());
        assert_eq!(settings.ai.model, crate::config::DEFAULT_MODEL);
        assert_eq!(settings.retention, RetentionPolicy::KeepAlive);
    }
}
