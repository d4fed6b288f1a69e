//! Application module structure for DeskApp
//!
//! - `core`: DeskApp struct, worker startup and shutdown
//! - `events`: worker results routed into the shell
//! - `update`: main update loop and global shortcuts
//! - `dialogs`: dialog rendering and dialog actions
//! - `ui::panels`: menu bar, navigation panel and display area

pub mod core;
pub mod dialogs;
pub mod events;
pub mod ui;
pub mod update;

pub use self::core::DeskApp;
