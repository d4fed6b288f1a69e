//! egui rendering pieces shared by the app shell:
//! - `menu`: top menu bar
//! - `shortcuts`: global keyboard shortcuts and their help overlay
//! - `dialogs`: settings and about windows, status toasts
//! - `theme`: dark/light visuals

pub mod dialogs;
pub mod menu;
pub mod shortcuts;
pub mod theme;
