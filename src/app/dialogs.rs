//! Dialog rendering orchestration

use eframe::egui;

use super::DeskApp;
use crate::config::{save_settings, store_api_key};
use crate::protocol::BackendAction;
use crate::ui;
use crate::ui::dialogs::DialogAction;

impl DeskApp {
    /// Render all dialogs and handle their actions
    pub(super) fn render_dialogs(&mut self, ctx: &egui::Context) {
        // Floating status toasts (top-right corner)
        ui::dialogs::render_status_toasts(ctx, &self.shell.state().status_messages);

        let labels = self.module_labels();
        for action in self.dialogs.render(ctx, &labels) {
            self.handle_dialog_action(ctx, action);
        }

        // Shortcuts help overlay (F1)
        self.shortcuts
            .render_help_overlay(ctx, &mut self.show_shortcuts_help);
    }

    fn handle_dialog_action(&mut self, ctx: &egui::Context, action: DialogAction) {
        match action {
            DialogAction::SaveSettings {
                settings,
                api_key_changed,
            } => {
                if api_key_changed {
                    if let Err(e) = store_api_key(settings.ai.api_key.as_deref()) {
                        tracing::warn!("Failed to store API key: {}", e);
                        self.shell
                            .state_mut()
                            .push_status("API key not saved to the keyring");
                    }
                }
                if settings.theme != self.settings.theme {
                    ui::theme::apply_theme(ctx, &ui::theme::DeskTheme::from_name(&settings.theme));
                }
                self.shell.set_retention_policy(settings.retention);
                let _ = self
                    .action_tx
                    .send(BackendAction::Configure(settings.ai.clone()));

                self.settings = settings;
                match save_settings(&self.settings) {
                    Ok(()) => self.shell.state_mut().push_status("Settings saved"),
                    Err(e) => {
                        tracing::warn!("Failed to save settings: {}", e);
                        self.shell
                            .state_mut()
                            .push_status(format!("Settings not saved: {e}"));
                    }
                }
            }
        }
    }
}
