//! Main update loop and global shortcuts

use eframe::egui;
use std::time::Duration;

use super::DeskApp;
use crate::ui::dialogs::TOAST_SECS;
use crate::ui::shortcuts::ShortcutAction;

impl eframe::App for DeskApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Route worker results to their modules
        if self.process_events() > 0 {
            ctx.request_repaint();
        }

        for action in self.shortcuts.triggered(ctx) {
            self.handle_shortcut(ctx, action);
        }

        // Remember the window size for the next start
        if let Some(rect) = ctx.input(|i| i.viewport().inner_rect) {
            self.settings.window.width = rect.width();
            self.settings.window.height = rect.height();
        }

        // Keep polling the worker while idle
        ctx.request_repaint_after(Duration::from_millis(100));
        self.shell.state_mut().purge_old_status_messages(TOAST_SECS);

        self.render_menu_bar(ctx);
        if self.show_navigation {
            self.render_navigation(ctx);
        }
        self.render_central_panel(ctx);
        self.render_dialogs(ctx);
    }
}

impl DeskApp {
    fn handle_shortcut(&mut self, ctx: &egui::Context, action: ShortcutAction) {
        match action {
            ShortcutAction::SelectModule(n) => {
                if let Some(id) = self.shell.state().nth_module(n).map(str::to_string) {
                    self.select_module(&id);
                }
            }
            ShortcutAction::NextModule => {
                if let Some(id) = self.shell.state().next_module().map(str::to_string) {
                    self.select_module(&id);
                }
            }
            ShortcutAction::PrevModule => {
                if let Some(id) = self.shell.state().prev_module().map(str::to_string) {
                    self.select_module(&id);
                }
            }
            ShortcutAction::Home => self.shell.go_home(),
            ShortcutAction::Settings => self.dialogs.open_settings(&self.settings),
            ShortcutAction::Help => self.show_shortcuts_help = !self.show_shortcuts_help,
            ShortcutAction::Quit => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
        }
    }
}
