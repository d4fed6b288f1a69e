//! Core DeskApp struct definition and initialization

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use eframe::egui;

use crate::backend::{run_backend, OpenAiChat, TaskDispatcher};
use crate::config::{save_settings, Settings};
use crate::dialog_manager::DialogManager;
use crate::modules::path_prompt::PathPrompt;
use crate::protocol::{BackendAction, BackendEvent};
use crate::registry::ModuleRegistry;
use crate::shell::Shell;
use crate::ui;
use crate::ui::shortcuts::ShortcutRegistry;

pub struct DeskApp {
    // Module host: instances, navigation state, bus
    pub shell: Shell,

    // Persisted preferences (API key lives in the keyring)
    pub settings: Settings,

    // Channels for worker communication
    pub action_tx: Sender<BackendAction>,
    pub event_rx: Receiver<BackendEvent>,

    // Dialogs - managed centrally by DialogManager
    pub dialogs: DialogManager,

    // Keyboard shortcuts registry
    pub shortcuts: ShortcutRegistry,
    pub show_shortcuts_help: bool,

    // UI visibility toggles
    pub show_navigation: bool,

    // Home screen "Open file…" prompt
    pub open_prompt: Option<PathPrompt>,

    worker: Option<thread::JoinHandle<()>>,
}

impl DeskApp {
    pub(super) fn theme(&self) -> ui::theme::DeskTheme {
        ui::theme::DeskTheme::from_name(&self.settings.theme)
    }

    pub fn new(cc: &eframe::CreationContext<'_>, registry: ModuleRegistry, settings: Settings) -> Self {
        // Create channels for UI <-> Worker
        let (action_tx, action_rx) = unbounded::<BackendAction>();
        let (event_tx, event_rx) = unbounded::<BackendEvent>();

        let chat = Arc::new(OpenAiChat::new(settings.ai.clone()));
        let worker_events = event_tx.clone();
        let worker = thread::Builder::new()
            .name("deskhub-worker".into())
            .spawn(move || run_backend(action_rx, worker_events, chat));
        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(e) => {
                // Tasks submitted from now on fail through the loopback
                tracing::error!("Failed to spawn background worker: {}", e);
                None
            }
        };

        ui::theme::apply_theme(&cc.egui_ctx, &ui::theme::DeskTheme::from_name(&settings.theme));

        let labels: Vec<String> = registry
            .list()
            .iter()
            .map(|d| d.display_name().to_string())
            .collect();
        let dispatcher = TaskDispatcher::new(action_tx.clone(), event_tx);
        let shell = Shell::new(registry, settings.retention, dispatcher);

        Self {
            shell,
            settings,
            action_tx,
            event_rx,
            dialogs: DialogManager::new(),
            shortcuts: ShortcutRegistry::new(&labels),
            show_shortcuts_help: false,
            show_navigation: true,
            open_prompt: None,
            worker,
        }
    }

    /// Navigation labels ("icon name") in registration order.
    pub(super) fn module_labels(&self) -> Vec<String> {
        self.shell
            .registry()
            .list()
            .iter()
            .map(|d| d.label())
            .collect()
    }

    /// Select a module, reporting unknown ids instead of failing.
    pub(super) fn select_module(&mut self, id: &str) {
        if let Err(e) = self.shell.select(id) {
            tracing::error!("Navigation failed: {}", e);
            self.shell.state_mut().push_status(e.to_string());
        }
    }
}

impl Drop for DeskApp {
    fn drop(&mut self) {
        // Unmount modules while the worker can still receive cancellations
        self.shell.shutdown();
        let _ = self.action_tx.send(BackendAction::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("Background worker panicked");
            }
        }

        if let Err(e) = save_settings(&self.settings) {
            tracing::warn!("Failed to save settings: {}", e);
        }
    }
}
