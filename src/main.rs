//! deskhub - a modular desktop shell built with egui
//!
//! Architecture:
//! - Main thread: runs the egui UI, the shell and every module
//! - Worker thread: runs a Tokio runtime for file I/O and chat requests
//! - Communication via crossbeam channels

use anyhow::{anyhow, Result};
use clap::Parser;
use eframe::egui;

use deskhub::app::DeskApp;
use deskhub::config::load_settings;
use deskhub::logging::init_logging;
use deskhub::registry::ModuleRegistry;

#[derive(Parser)]
#[command(name = "deskhub")]
#[command(author, version, about = "Modular desktop shell: notepad, viewers and an AI chat", long_about = None)]
struct Cli {}

fn main() -> Result<()> {
    let _cli = Cli::parse();
    init_logging();

    let settings = load_settings();
    let registry = ModuleRegistry::with_builtin_modules().map_err(|e| {
        tracing::error!("Invalid module configuration: {}", e);
        e
    })?;
    tracing::info!(modules = registry.len(), "starting deskhub");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("deskhub")
            .with_inner_size([settings.window.width, settings.window.height])
            .with_min_inner_size([480.0, 320.0]),
        ..Default::default()
    };

    eframe::run_native(
        "deskhub",
        options,
        Box::new(move |cc| Ok(Box::new(DeskApp::new(cc, registry, settings)))),
    )
    .map_err(|e| anyhow!("UI error: {e}"))
}
