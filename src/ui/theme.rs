//! Dark and light themes.
//!
//! A small surface hierarchy plus semantic colors:
//! - `surface[0]`: app background (central panel)
//! - `surface[1]`: side panel and menu bar
//! - `surface[2]`: selected navigation entry

use eframe::egui::{self, Color32, CornerRadius, Stroke};

#[derive(Clone, Debug)]
pub struct DeskTheme {
    pub dark: bool,
    pub surface: [Color32; 3],
    pub accent: Color32,
    pub error: Color32,
    pub text_muted: Color32,
    pub border: Color32,
}

impl DeskTheme {
    pub fn dark() -> Self {
        Self {
            dark: true,
            surface: [
                Color32::from_rgb(28, 28, 38),
                Color32::from_rgb(19, 19, 26),
                Color32::from_rgb(46, 46, 62),
            ],
            accent: Color32::from_rgb(88, 101, 242),
            error: Color32::from_rgb(240, 71, 71),
            text_muted: Color32::from_rgb(114, 118, 125),
            border: Color32::from_rgb(47, 49, 54),
        }
    }

    pub fn light() -> Self {
        Self {
            dark: false,
            surface: [
                Color32::from_rgb(255, 255, 255),
                Color32::from_rgb(242, 243, 245),
                Color32::from_rgb(212, 215, 220),
            ],
            accent: Color32::from_rgb(88, 101, 242),
            error: Color32::from_rgb(220, 50, 50),
            text_muted: Color32::from_rgb(116, 127, 141),
            border: Color32::from_rgb(210, 213, 219),
        }
    }

    /// "light" selects the light theme; anything else is dark.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }
}

/// Set visuals and spacing for `theme` on the whole context.
pub fn apply_theme(ctx: &egui::Context, theme: &DeskTheme) {
    let mut style = (*ctx.style()).clone();
    style.visuals = if theme.dark {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    };

    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.window_margin = egui::Margin::same(12);
    style.spacing.button_padding = egui::vec2(10.0, 5.0);

    for widget in [
        &mut style.visuals.widgets.inactive,
        &mut style.visuals.widgets.hovered,
        &mut style.visuals.widgets.active,
    ] {
        widget.corner_radius = CornerRadius::same(6);
    }
    style.visuals.widgets.inactive.bg_stroke = Stroke::NONE;
    style.visuals.widgets.active.bg_fill = theme.accent;
    style.visuals.widgets.active.weak_bg_fill = theme.accent;
    style.visuals.selection.bg_fill = theme.accent.linear_multiply(0.4);
    style.visuals.panel_fill = theme.surface[0];

    ctx.set_style(style);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert!(!DeskTheme::from_name("light").dark);
        assert!(DeskTheme::from_name("dark").dark);
        assert!(DeskTheme::from_name("solarized").dark);
    }

    #[test]
    fn test_apply_theme_switches_visuals() {
        let ctx = egui::Context::default();
        apply_theme(&ctx, &DeskTheme::light());
        assert!(!ctx.style().visuals.dark_mode);
        apply_theme(&ctx, &DeskTheme::dark());
        assert!(ctx.style().visuals.dark_mode);
    }
}
