//! Modal dialogs and windows - self-contained dialog components.
//!
//! Each dialog owns its editing state and returns `DialogAction`s
//! instead of mutating external state directly.
//!
//! Dialogs are stored as `Option<Dialog>` in the dialog manager:
//! - `None` = dialog is closed
//! - `Some(dialog)` = dialog is open with its state

mod actions;
mod help;
mod settings;
mod status_toasts;

pub use actions::DialogAction;
pub use help::HelpDialog;
pub use settings::SettingsDialog;
pub use status_toasts::{render_status_toasts, TOAST_SECS};
