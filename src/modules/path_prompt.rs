//! Inline path entry used by modules for open / save-as.

use std::path::PathBuf;

use eframe::egui;

/// What the user did with the prompt this frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    Submit(PathBuf),
    Cancel,
}

/// Self-contained path prompt state.
#[derive(Debug, Clone)]
pub struct PathPrompt {
    /// Label on the confirm button ("Open", "Save")
    verb: &'static str,
    /// Extension hint shown in the hint text ("*.txt")
    hint: &'static str,
    pub input: String,
}

impl PathPrompt {
    pub fn new(verb: &'static str, hint: &'static str) -> Self {
        Self {
            verb,
            hint,
            input: String::new(),
        }
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = input.into();
        self
    }

    /// The entered path, or `None` while the field is blank.
    pub fn path(&self) -> Option<PathBuf> {
        let trimmed = self.input.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(PathBuf::from(trimmed))
        }
    }

    /// Render as a single row. Enter submits, Escape cancels.
    pub fn show(&mut self, ui: &mut egui::Ui) -> Option<PromptOutcome> {
        let mut outcome = None;
        ui.horizontal(|ui| {
            ui.label("Path:");
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.input)
                    .desired_width(ui.available_width() - 140.0)
                    .hint_text(self.hint),
            );
            let path = self.path();

            let enter = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.add_enabled(path.is_some(), egui::Button::new(self.verb)).clicked() || enter {
                if let Some(path) = path {
                    outcome = Some(PromptOutcome::Submit(path));
                }
            }
            if ui.button("Cancel").clicked() || ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                outcome = Some(PromptOutcome::Cancel);
            }
        });
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_input_has_no_path() {
        let prompt = PathPrompt::new("Open", "*.txt");
        assert!(prompt.path().is_none());
        assert!(prompt.with_input("   ").path().is_none());
    }

    #[test]
    fn test_input_is_trimmed() {
        let prompt = PathPrompt::new("Save", "*.txt").with_input("  /tmp/a b.txt ");
        assert_eq!(prompt.path(), Some(PathBuf::from("/tmp/a b.txt")));
    }
}
