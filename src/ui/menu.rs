//! Horizontal menu bar: File, Modules, View, Help.

use eframe::egui;

use super::shortcuts::{ShortcutAction, ShortcutRegistry};

/// Actions that the menu can request
#[derive(Debug, Clone, PartialEq)]
pub enum MenuAction {
    OpenFile,
    Select(String),
    Home,
    Settings,
    Shortcuts,
    About,
}

/// One navigation entry as the menu shows it.
pub struct MenuEntry<'a> {
    pub id: &'a str,
    pub label: String,
}

fn item_with_hint(ui: &mut egui::Ui, text: impl Into<egui::WidgetText>, hint: &str) -> bool {
    let mut clicked = false;
    ui.horizontal(|ui| {
        clicked = ui.button(text).clicked();
        if !hint.is_empty() {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(egui::RichText::new(hint).weak().small());
            });
        }
    });
    clicked
}

/// Render the menu bar. Returns Some(MenuAction) if an action was requested.
pub fn render_menu_bar(
    ctx: &egui::Context,
    ui: &mut egui::Ui,
    entries: &[MenuEntry<'_>],
    active: Option<&str>,
    shortcuts: &ShortcutRegistry,
    show_navigation: &mut bool,
) -> Option<MenuAction> {
    let mut menu_action: Option<MenuAction> = None;

    egui::menu::bar(ui, |ui| {
        ui.menu_button("File", |ui| {
            if item_with_hint(ui, "Open file…", "") {
                menu_action = Some(MenuAction::OpenFile);
                ui.close_menu();
            }
            if item_with_hint(ui, "Settings…", shortcuts.hint(ShortcutAction::Settings)) {
                menu_action = Some(MenuAction::Settings);
                ui.close_menu();
            }
            ui.separator();
            if item_with_hint(ui, "Quit", shortcuts.hint(ShortcutAction::Quit)) {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        ui.menu_button("Modules", |ui| {
            if item_with_hint(ui, "🏠 Home", shortcuts.hint(ShortcutAction::Home)) {
                menu_action = Some(MenuAction::Home);
                ui.close_menu();
            }
            ui.separator();
            for (n, entry) in entries.iter().enumerate() {
                let hint = shortcuts.hint(ShortcutAction::SelectModule(n));
                let text = if active == Some(entry.id) {
                    egui::RichText::new(&entry.label).strong()
                } else {
                    egui::RichText::new(&entry.label)
                };
                if item_with_hint(ui, text, hint) {
                    menu_action = Some(MenuAction::Select(entry.id.to_string()));
                    ui.close_menu();
                }
            }
        });

        ui.menu_button("View", |ui| {
            ui.checkbox(show_navigation, "Show Navigation");
        });

        ui.menu_button("Help", |ui| {
            if item_with_hint(ui, "Keyboard Shortcuts", shortcuts.hint(ShortcutAction::Help)) {
                menu_action = Some(MenuAction::Shortcuts);
                ui.close_menu();
            }
            if item_with_hint(ui, "About", "") {
                menu_action = Some(MenuAction::About);
                ui.close_menu();
            }
        });
    });

    menu_action
}
