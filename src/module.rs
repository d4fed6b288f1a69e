//! The capability set every hosted feature module implements.

use std::collections::HashMap;
use std::path::PathBuf;

use eframe::egui;

use crate::backend::TaskDispatcher;
use crate::bus::{BusMessage, Outbox};
use crate::error::{ModuleError, ModuleMountError};
use crate::protocol::{BackendAction, BackendEvent, ChatRequest, TaskId};

/// A feature module hosted by the shell.
///
/// The shell owns every instance exclusively and drives it through this
/// trait only; it never inspects which concrete module it holds.
///
/// Lifecycle: `Unmounted -> Mounted -> Unmounted`, with an extra
/// `Mounted -> Hidden -> Mounted` loop under the keep-alive policy. Hiding
/// calls [`unmount`](Self::unmount) and showing again calls
/// [`mount`](Self::mount), so a module must tolerate repeated pairs.
pub trait FeatureModule {
    /// Attach to the display region. An error leaves the module unmounted.
    fn mount(&mut self, cx: &mut ModuleContext<'_>) -> Result<(), ModuleMountError>;

    /// Release UI resources. Called before the instance is discarded or cached.
    fn unmount(&mut self, cx: &mut ModuleContext<'_>);

    /// Bus delivery. Hidden instances receive messages too.
    fn on_message(
        &mut self,
        _message: &BusMessage,
        _cx: &mut ModuleContext<'_>,
    ) -> Result<(), ModuleError> {
        Ok(())
    }

    /// Result of a background task this instance submitted while mounted.
    fn on_task_event(&mut self, _event: BackendEvent, _cx: &mut ModuleContext<'_>) {}

    /// Render into the display region. Only called while mounted.
    fn ui(&mut self, ui: &mut egui::Ui, cx: &mut ModuleContext<'_>);

    /// Work that dropping this instance would lose. The shell keeps such an
    /// instance hidden instead of discarding it.
    fn has_unsaved_changes(&self) -> bool {
        false
    }
}

/// Shell-side services shared by all instances.
pub(crate) struct Services {
    pub(crate) outbox: Outbox,
    pub(crate) dispatcher: TaskDispatcher,
    /// Owning module id for every task still in flight.
    pub(crate) task_owners: HashMap<TaskId, String>,
    /// Short notices raised by modules, picked up by the shell as toasts.
    pub(crate) notices: Vec<String>,
}

impl Services {
    pub(crate) fn new(dispatcher: TaskDispatcher) -> Self {
        Self {
            outbox: Outbox::default(),
            dispatcher,
            task_owners: HashMap::new(),
            notices: Vec::new(),
        }
    }

    /// Cancel every task owned by `module` and forget where to route them.
    pub(crate) fn cancel_owned(&mut self, module: &str) -> usize {
        let owned: Vec<TaskId> = self
            .task_owners
            .iter()
            .filter(|(_, owner)| owner.as_str() == module)
            .map(|(task, _)| *task)
            .collect();
        for task in &owned {
            self.task_owners.remove(task);
            self.dispatcher.cancel(*task);
        }
        owned.len()
    }
}

/// Handle given to a module for the duration of one callback.
pub struct ModuleContext<'a> {
    module_id: &'a str,
    services: &'a mut Services,
}

impl<'a> ModuleContext<'a> {
    pub(crate) fn new(module_id: &'a str, services: &'a mut Services) -> Self {
        Self {
            module_id,
            services,
        }
    }

    pub fn module_id(&self) -> &str {
        self.module_id
    }

    /// Queue a bus message. It is delivered once the current callback returns.
    pub fn publish(&mut self, message: BusMessage) {
        self.services.outbox.push(message);
    }

    /// Show a short notice in the shell's toast area.
    pub fn notify(&mut self, text: impl Into<String>) {
        self.services.notices.push(text.into());
    }

    pub fn load_file(&mut self, path: PathBuf) -> TaskId {
        self.submit(|task| BackendAction::LoadFile { task, path })
    }

    pub fn save_file(&mut self, path: PathBuf, bytes: Vec<u8>) -> TaskId {
        self.submit(|task| BackendAction::SaveFile { task, path, bytes })
    }

    /// Read and decode an image on the worker; answers with `ImageDecoded`.
    pub fn decode_image(&mut self, path: PathBuf) -> TaskId {
        self.submit(|task| BackendAction::DecodeImage { task, path })
    }

    /// Read a PDF and inspect it on the worker; answers with `PdfInspected`.
    pub fn inspect_pdf(&mut self, path: PathBuf) -> TaskId {
        self.submit(|task| BackendAction::InspectPdf { task, path })
    }

    pub fn request_chat(&mut self, request: ChatRequest) -> TaskId {
        self.submit(|task| BackendAction::Chat { task, request })
    }

    pub fn cancel(&mut self, task: TaskId) {
        if self.services.task_owners.remove(&task).is_some() {
            self.services.dispatcher.cancel(task);
        }
    }

    fn submit(&mut self, build: impl FnOnce(TaskId) -> BackendAction) -> TaskId {
        let task = self.services.dispatcher.submit(build);
        self.services
            .task_owners
            .insert(task, self.module_id.to_string());
        task
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crossbeam_channel::{unbounded, Receiver};

    /// Services wired to in-memory channels, plus the worker's end of them.
    pub(crate) fn services() -> (Services, Receiver<BackendAction>, Receiver<BackendEvent>) {
        let (action_tx, action_rx) = unbounded();
        let (event_tx, event_rx) = unbounded();
        (
            Services::new(TaskDispatcher::new(action_tx, event_tx)),
            action_rx,
            event_rx,
        )
    }

    /// Topics queued in the outbox, oldest first.
    pub(crate) fn drain_topics(services: &mut Services) -> Vec<String> {
        let mut topics = Vec::new();
        while let Some(message) = services.outbox.pop() {
            topics.push(message.topic().to_string());
        }
        topics
    }
}
