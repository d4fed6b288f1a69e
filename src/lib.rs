//! deskhub library.
//!
//! A window shell that hosts independent feature modules. The pieces:
//! - [`registry`]: explicit list of module descriptors
//! - [`module`]: the contract every module implements
//! - [`bus`]: topic-based messages between modules
//! - [`shell`]: instantiation, mounting and navigation
//! - [`backend`]: worker thread for file I/O and the chat service
//! - [`media`]: image decoding and PDF inspection run by the worker
//! - [`modules`]: the built-in notepad, viewers and AI chat

pub mod app;
pub mod backend;
pub mod bus;
pub mod config;
pub mod dialog_manager;
pub mod error;
pub mod logging;
pub mod media;
pub mod module;
pub mod modules;
pub mod protocol;
pub mod registry;
pub mod shell;
pub mod state;
pub mod ui;
