//! About dialog - what the app is and which modules it hosts.

use eframe::egui;

/// Self-contained about dialog state.
#[derive(Default)]
pub struct HelpDialog {
    /// Whether the dialog is visible
    pub open: bool,
}

impl HelpDialog {
    /// Create a new dialog (closed by default)
    pub fn new() -> Self {
        Self { open: false }
    }

    pub fn show(&mut self) {
        self.open = true;
    }

    /// Render the dialog listing `modules` as navigation labels.
    /// Returns true if the dialog is still open.
    pub fn render(&mut self, ctx: &egui::Context, modules: &[String]) -> bool {
        if !self.open {
            return false;
        }

        let mut still_open = true;
        egui::Window::new("About deskhub")
            .open(&mut still_open)
            .resizable(false)
            .collapsible(false)
            .show(ctx, |ui| {
                ui.heading(format!("deskhub {}", env!("CARGO_PKG_VERSION")));
                ui.label("A desktop shell that hosts independent tool modules in one window.");
                ui.separator();

                ui.label("Installed modules:");
                for module in modules {
                    ui.label(format!("  • {module}"));
                }

                ui.separator();
                ui.label("Modules talk through a message bus, for example");
                ui.label("  • Notepad → \"Send to AI chat\" opens the chat with your text");
                ui.label("  • Home → \"Open file…\" picks the right viewer by extension");
                ui.add_space(4.0);
                ui.label(egui::RichText::new("Press F1 for keyboard shortcuts.").weak());
            });

        if !still_open {
            self.open = false;
        }

        self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_opens_and_closed_dialog_renders_nothing() {
        let mut dialog = HelpDialog::new();
        assert!(!dialog.open);
        let ctx = egui::Context::default();
        let mut still_open = true;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            still_open = dialog.render(ctx, &[]);
        });
        assert!(!still_open);

        dialog.show();
        assert!(dialog.open);
    }
}
