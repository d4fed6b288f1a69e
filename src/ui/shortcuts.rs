//! Keyboard shortcut registry and help overlay.
//!
//! Single source of truth for global shortcuts: the update loop asks the
//! registry which actions fired this frame, and the help overlay (F1)
//! lists the same table.

use eframe::egui;

/// Category of shortcuts for organization in help overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutCategory {
    File,
    Navigation,
    Help,
}

impl ShortcutCategory {
    pub fn name(&self) -> &'static str {
        match self {
            Self::File => "File",
            Self::Navigation => "Navigation",
            Self::Help => "Help",
        }
    }
}

/// What a shortcut asks the app to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    /// Select the nth registered module (zero-based)
    SelectModule(usize),
    NextModule,
    PrevModule,
    Home,
    Settings,
    Help,
    Quit,
}

/// A keyboard shortcut definition
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub category: ShortcutCategory,
    pub modifiers: egui::Modifiers,
    pub key: egui::Key,
    pub key_text: String,
    pub description: String,
    pub action: ShortcutAction,
}

impl Shortcut {
    fn new(
        category: ShortcutCategory,
        modifiers: egui::Modifiers,
        key: egui::Key,
        key_text: impl Into<String>,
        description: impl Into<String>,
        action: ShortcutAction,
    ) -> Self {
        Self {
            category,
            modifiers,
            key,
            key_text: key_text.into(),
            description: description.into(),
            action,
        }
    }
}

const NUMBER_KEYS: [egui::Key; 9] = [
    egui::Key::Num1,
    egui::Key::Num2,
    egui::Key::Num3,
    egui::Key::Num4,
    egui::Key::Num5,
    egui::Key::Num6,
    egui::Key::Num7,
    egui::Key::Num8,
    egui::Key::Num9,
];

/// Global keyboard shortcut registry
pub struct ShortcutRegistry {
    shortcuts: Vec<Shortcut>,
}

impl ShortcutRegistry {
    /// Build the table. `module_names` are in navigation order; the first
    /// nine get Ctrl+1..9.
    pub fn new(module_names: &[String]) -> Self {
        use egui::{Key, Modifiers};
        use ShortcutCategory::*;

        let mut shortcuts = vec![
            Shortcut::new(File, Modifiers::COMMAND, Key::Comma, "Ctrl+,", "Settings", ShortcutAction::Settings),
            Shortcut::new(File, Modifiers::COMMAND, Key::Q, "Ctrl+Q", "Quit application", ShortcutAction::Quit),
            Shortcut::new(Navigation, Modifiers::COMMAND, Key::H, "Ctrl+H", "Home screen", ShortcutAction::Home),
            Shortcut::new(
                Navigation,
                Modifiers::COMMAND,
                Key::PageDown,
                "Ctrl+PgDn",
                "Next module",
                ShortcutAction::NextModule,
            ),
            Shortcut::new(
                Navigation,
                Modifiers::COMMAND,
                Key::PageUp,
                "Ctrl+PgUp",
                "Previous module",
                ShortcutAction::PrevModule,
            ),
        ];
        for (n, (name, key)) in module_names.iter().zip(NUMBER_KEYS).enumerate() {
            shortcuts.push(Shortcut::new(
                Navigation,
                Modifiers::COMMAND,
                key,
                format!("Ctrl+{}", n + 1),
                format!("Open {name}"),
                ShortcutAction::SelectModule(n),
            ));
        }
        shortcuts.push(Shortcut::new(
            Help,
            Modifiers::NONE,
            Key::F1,
            "F1",
            "Keyboard shortcuts",
            ShortcutAction::Help,
        ));

        Self { shortcuts }
    }

    /// Get all shortcuts for a specific category
    pub fn by_category(&self, category: ShortcutCategory) -> Vec<&Shortcut> {
        self.shortcuts
            .iter()
            .filter(|s| s.category == category)
            .collect()
    }

    pub fn find(&self, action: ShortcutAction) -> Option<&Shortcut> {
        self.shortcuts.iter().find(|s| s.action == action)
    }

    /// Key label for `action`, empty when it has no shortcut.
    pub fn hint(&self, action: ShortcutAction) -> &str {
        self.find(action).map_or("", |s| s.key_text.as_str())
    }

    /// Consume this frame's key presses that match a shortcut.
    pub fn triggered(&self, ctx: &egui::Context) -> Vec<ShortcutAction> {
        ctx.input_mut(|i| {
            self.shortcuts
                .iter()
                .filter(|s| i.consume_key(s.modifiers, s.key))
                .map(|s| s.action)
                .collect()
        })
    }

    /// Render the keyboard shortcuts help overlay (F1)
    pub fn render_help_overlay(&self, ctx: &egui::Context, open: &mut bool) {
        let mut should_close = false;

        egui::Window::new("⌨ Keyboard Shortcuts")
            .open(open)
            .collapsible(false)
            .resizable(false)
            .default_width(420.0)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                for category in [
                    ShortcutCategory::File,
                    ShortcutCategory::Navigation,
                    ShortcutCategory::Help,
                ] {
                    let category_shortcuts = self.by_category(category);
                    if category_shortcuts.is_empty() {
                        continue;
                    }

                    ui.label(
                        egui::RichText::new(category.name())
                            .strong()
                            .color(egui::Color32::from_rgb(88, 101, 242)),
                    );
                    ui.add_space(4.0);

                    egui::Grid::new(format!("shortcuts_{:?}", category))
                        .num_columns(2)
                        .spacing([20.0, 6.0])
                        .show(ui, |ui| {
                            for shortcut in category_shortcuts {
                                ui.label(
                                    egui::RichText::new(&shortcut.key_text)
                                        .monospace()
                                        .color(egui::Color32::from_rgb(200, 200, 200))
                                        .background_color(egui::Color32::from_rgb(55, 60, 70)),
                                );
                                ui.label(&shortcut.description);
                                ui.end_row();
                            }
                        });

                    ui.add_space(12.0);
                }

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Close").clicked() {
                        should_close = true;
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(egui::RichText::new("Press Esc or F1 to close").weak());
                    });
                });
                if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                    should_close = true;
                }
            });

        if should_close {
            *open = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("Module {i}")).collect()
    }

    #[test]
    fn test_number_shortcuts_follow_modules() {
        let registry = ShortcutRegistry::new(&names(3));
        let select = registry
            .by_category(ShortcutCategory::Navigation)
            .into_iter()
            .filter(|s| matches!(s.action, ShortcutAction::SelectModule(_)))
            .count();
        assert_eq!(select, 3);

        let second = registry.find(ShortcutAction::SelectModule(1)).unwrap();
        assert_eq!(second.key_text, "Ctrl+2");
        assert_eq!(second.description, "Open Module 2");
    }

    #[test]
    fn test_at_most_nine_number_shortcuts() {
        let registry = ShortcutRegistry::new(&names(12));
        assert!(registry.find(ShortcutAction::SelectModule(8)).is_some());
        assert!(registry.find(ShortcutAction::SelectModule(9)).is_none());
        assert_eq!(registry.hint(ShortcutAction::SelectModule(8)), "Ctrl+9");
        assert_eq!(registry.hint(ShortcutAction::SelectModule(9)), "");
    }

    #[test]
    fn test_fixed_shortcuts() {
        let registry = ShortcutRegistry::new(&[]);
        assert_eq!(registry.find(ShortcutAction::Home).unwrap().key_text, "Ctrl+H");
        assert_eq!(registry.find(ShortcutAction::Settings).unwrap().key, egui::Key::Comma);
        assert_eq!(registry.find(ShortcutAction::Help).unwrap().key, egui::Key::F1);
        assert!(!registry.by_category(ShortcutCategory::File).is_empty());
    }

    #[test]
    fn test_triggered_consumes_matching_key() {
        let registry = ShortcutRegistry::new(&names(2));
        let ctx = egui::Context::default();
        let mut raw = egui::RawInput::default();
        raw.events.push(egui::Event::Key {
            key: egui::Key::Num2,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers: egui::Modifiers::COMMAND,
        });
        let mut fired = Vec::new();
        let _ = ctx.run(raw, |ctx| fired = registry.triggered(ctx));
        assert_eq!(fired, vec![ShortcutAction::SelectModule(1)]);
    }
}
