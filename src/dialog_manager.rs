//! Dialog management for centralized dialog state and rendering.
//!
//! Keeps dialog state out of the main app struct and gives a small API for
//! opening dialogs and collecting their actions each frame.

use eframe::egui::Context;

use crate::config::Settings;
use crate::ui::dialogs::{DialogAction, HelpDialog, SettingsDialog};

/// Manages all application dialogs in one place.
///
/// Uses the Option<Dialog> pattern where None = closed, Some = open.
pub struct DialogManager {
    pub about_dialog: HelpDialog,
    pub settings_dialog: Option<SettingsDialog>,
}

impl DialogManager {
    pub fn new() -> Self {
        Self {
            about_dialog: HelpDialog::new(),
            settings_dialog: None,
        }
    }

    /// Open the settings dialog on a copy of `current`.
    pub fn open_settings(&mut self, current: &Settings) {
        self.settings_dialog = Some(SettingsDialog::new(current));
    }

    pub fn show_about(&mut self) {
        self.about_dialog.show();
    }

    /// Render all dialogs and collect their actions.
    pub fn render(&mut self, ctx: &Context, module_labels: &[String]) -> Vec<DialogAction> {
        let mut actions: Vec<DialogAction> = Vec::new();

        self.about_dialog.render(ctx, module_labels);

        let mut close_settings = false;
        if let Some(ref mut dialog) = self.settings_dialog {
            let (action, still_open) = dialog.render(ctx);
            if let Some(action) = action {
                actions.push(action);
            }
            if !still_open {
                close_settings = true;
            }
        }
        if close_settings {
            self.settings_dialog = None;
        }

        actions
    }
}

impl Default for DialogManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialog_manager_new() {
        let dm = DialogManager::new();
        assert!(dm.settings_dialog.is_none());
        assert!(!dm.about_dialog.open);
    }

    #[test]
    fn test_open_settings_and_about() {
        let mut dm = DialogManager::new();
        dm.open_settings(&Settings::default());
        dm.show_about();
        assert!(dm.settings_dialog.is_some());
        assert!(dm.about_dialog.open);
    }
}
