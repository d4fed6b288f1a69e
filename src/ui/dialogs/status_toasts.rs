//! Status toast notifications - floating messages in the top-right corner.

use std::time::Instant;

use eframe::egui;

/// How long a toast stays on screen, in seconds.
pub const TOAST_SECS: u64 = 4;

/// Render floating status toasts (top-right corner, below the menu bar).
pub fn render_status_toasts(ctx: &egui::Context, status_messages: &[(String, Instant)]) {
    if status_messages.is_empty() {
        return;
    }

    egui::Area::new(egui::Id::new("status_toast_area"))
        .anchor(egui::Align2::RIGHT_TOP, [-10.0, 40.0])
        .show(ctx, |ui| {
            egui::Frame::new()
                .fill(egui::Color32::from_rgba_unmultiplied(30, 30, 30, 230))
                .corner_radius(6.0)
                .inner_margin(egui::Margin::symmetric(12, 8))
                .show(ui, |ui| {
                    for (msg, _) in status_messages {
                        ui.label(egui::RichText::new(msg).color(egui::Color32::LIGHT_GREEN));
                    }
                });
        });
}
