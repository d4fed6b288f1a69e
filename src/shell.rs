//! The shell: hosts module instances and coordinates navigation.
//!
//! The shell is the only owner of module instances and the only writer of
//! [`ShellState`]. At most one instance is mounted at a time. A module that
//! fails to mount never becomes active; its error is kept for the display
//! area to show in place of the module.

use std::collections::BTreeMap;

use eframe::egui;

use crate::backend::TaskDispatcher;
use crate::bus::{topics, BusMessage, Delivery};
use crate::config::RetentionPolicy;
use crate::error::{ModuleMountError, ShellError};
use crate::module::{FeatureModule, ModuleContext, Services};
use crate::protocol::BackendEvent;
use crate::registry::ModuleRegistry;
use crate::state::ShellState;

/// Where an instance sits in its lifecycle while the shell holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Mounted,
    /// Unmounted but cached, under the keep-alive policy or because the
    /// instance still holds unsaved changes.
    Hidden,
}

struct Slot {
    id: String,
    module: Box<dyn FeatureModule>,
    lifecycle: Lifecycle,
}

pub struct Shell {
    registry: ModuleRegistry,
    policy: RetentionPolicy,
    state: ShellState,
    /// Live instances keyed by registration index, so iteration follows
    /// registration order.
    slots: BTreeMap<usize, Slot>,
    services: Services,
    mount_error: Option<ModuleMountError>,
}

impl Shell {
    pub fn new(registry: ModuleRegistry, policy: RetentionPolicy, dispatcher: TaskDispatcher) -> Self {
        let state = ShellState::new(registry.ids());
        tracing::info!(modules = registry.len(), ?policy, "shell ready");
        Self {
            registry,
            policy,
            state,
            slots: BTreeMap::new(),
            services: Services::new(dispatcher),
            mount_error: None,
        }
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ShellState {
        &mut self.state
    }

    pub fn active_module(&self) -> Option<&str> {
        self.state.active_module.as_deref()
    }

    pub fn retention_policy(&self) -> RetentionPolicy {
        self.policy
    }

    /// The failure to show in the display area, if the last activation failed.
    pub fn mount_error(&self) -> Option<&ModuleMountError> {
        self.mount_error.as_ref()
    }

    pub fn dismiss_mount_error(&mut self) {
        self.mount_error = None;
    }

    /// Lifecycle of the live instance for `id`, if the shell holds one.
    pub fn lifecycle(&self, id: &str) -> Option<Lifecycle> {
        self.slots
            .values()
            .find(|slot| slot.id == id)
            .map(|slot| slot.lifecycle)
    }

    /// Number of instances currently mounted.
    pub fn mounted_count(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| slot.lifecycle == Lifecycle::Mounted)
            .count()
    }

    /// Number of instances the shell holds (mounted or hidden).
    pub fn live_count(&self) -> usize {
        self.slots.len()
    }

    /// Switch the display area to module `id`.
    ///
    /// An unknown id is a configuration error. A failing `mount` is not an
    /// error here: it is recorded in [`mount_error`](Self::mount_error) and
    /// the previously active module stays as it was.
    pub fn select(&mut self, id: &str) -> Result<(), ShellError> {
        self.registry.resolve(id)?;
        if self.state.is_active(id) {
            self.mount_error = None;
            return Ok(());
        }
        self.activate(id);
        self.flush_outbox();
        Ok(())
    }

    /// Leave the active module and show the home screen.
    pub fn go_home(&mut self) {
        self.mount_error = None;
        if let Some(previous) = self.state.active_module.take() {
            self.deactivate(&previous);
        }
        self.flush_outbox();
    }

    /// Publish a message from outside any module (menus, the app itself).
    pub fn publish(&mut self, message: BusMessage) {
        self.services.outbox.push(message);
        self.flush_outbox();
    }

    /// Route a worker result to the module that submitted the task.
    ///
    /// Results for cancelled tasks, or for owners no longer mounted, are dropped.
    pub fn handle_task_event(&mut self, event: BackendEvent) {
        let task = event.task();
        let Some(owner) = self.services.task_owners.remove(&task) else {
            tracing::debug!(?task, "dropping result of cancelled task");
            return;
        };
        let Some(slot) = self
            .slots
            .values_mut()
            .find(|slot| slot.id == owner && slot.lifecycle == Lifecycle::Mounted)
        else {
            tracing::debug!(?task, %owner, "owner no longer mounted, dropping result");
            return;
        };
        let mut cx = ModuleContext::new(&slot.id, &mut self.services);
        slot.module.on_task_event(event, &mut cx);
        self.flush_outbox();
    }

    /// Render the active module into `ui`. Returns false when nothing is active.
    pub fn render_active(&mut self, ui: &mut egui::Ui) -> bool {
        let Some(active) = self.state.active_module.as_deref() else {
            return false;
        };
        let Some(slot) = self.slots.values_mut().find(|slot| slot.id == active) else {
            return false;
        };
        let mut cx = ModuleContext::new(&slot.id, &mut self.services);
        slot.module.ui(ui, &mut cx);
        self.flush_outbox();
        true
    }

    /// Change the retention policy. Leaving keep-alive discards hidden
    /// instances, except those with unsaved changes.
    pub fn set_retention_policy(&mut self, policy: RetentionPolicy) {
        if policy == self.policy {
            return;
        }
        self.policy = policy;
        if policy == RetentionPolicy::Recreate {
            // Hidden instances were unmounted when they were hidden
            let before = self.slots.len();
            self.slots.retain(|_, slot| {
                slot.lifecycle == Lifecycle::Mounted || slot.module.has_unsaved_changes()
            });
            tracing::debug!(discarded = before - self.slots.len(), "cache cleared");
        }
        tracing::info!(?policy, "retention policy changed");
    }

    /// Unmount every live instance and drop them all.
    pub fn shutdown(&mut self) {
        let slots = std::mem::take(&mut self.slots);
        for (_, mut slot) in slots {
            if slot.lifecycle == Lifecycle::Mounted {
                let mut cx = ModuleContext::new(&slot.id, &mut self.services);
                slot.module.unmount(&mut cx);
            }
            self.services.cancel_owned(&slot.id);
            if slot.module.has_unsaved_changes() {
                tracing::warn!(module = %slot.id, "unsaved changes discarded at shutdown");
            }
        }
        self.state.active_module = None;
        let lost = self.services.outbox.clear();
        if lost > 0 {
            tracing::debug!(lost, "bus messages dropped at shutdown");
        }
    }

    fn activate(&mut self, id: &str) {
        let Some(index) = self.registry.position(id) else {
            return;
        };
        let (mut slot, cached) = match self.slots.remove(&index) {
            Some(cached) => (cached, true),
            None => {
                let fresh = Slot {
                    id: id.to_string(),
                    module: self.registry.list()[index].instantiate(),
                    lifecycle: Lifecycle::Hidden,
                };
                (fresh, false)
            }
        };

        let mounted = {
            let mut cx = ModuleContext::new(&slot.id, &mut self.services);
            slot.module.mount(&mut cx)
        };
        if let Err(err) = mounted {
            tracing::warn!(module = id, error = %err, "module failed to mount");
            self.services.cancel_owned(id);
            if cached {
                // Still hidden; its state survives for the next attempt
                self.slots.insert(index, slot);
            }
            self.state.push_status(format!("Could not open {}", self.display_name(id)));
            self.mount_error = Some(err);
            return;
        }

        slot.lifecycle = Lifecycle::Mounted;
        if let Some(previous) = self.state.active_module.take() {
            self.deactivate(&previous);
        }
        self.slots.insert(index, slot);
        self.state.active_module = Some(id.to_string());
        self.mount_error = None;
        tracing::info!(module = id, "module activated");
    }

    fn deactivate(&mut self, id: &str) {
        let Some(index) = self.registry.position(id) else {
            return;
        };
        let Some(mut slot) = self.slots.remove(&index) else {
            return;
        };
        {
            let mut cx = ModuleContext::new(&slot.id, &mut self.services);
            slot.module.unmount(&mut cx);
        }
        let cancelled = self.services.cancel_owned(id);
        if cancelled > 0 {
            tracing::debug!(module = id, cancelled, "cancelled tasks on unmount");
        }

        match self.policy {
            RetentionPolicy::Recreate if slot.module.has_unsaved_changes() => {
                slot.lifecycle = Lifecycle::Hidden;
                self.slots.insert(index, slot);
                self.state.push_status(format!(
                    "{} has unsaved changes and stays open in the background",
                    self.display_name(id)
                ));
                tracing::info!(module = id, "module kept for its unsaved changes");
            }
            RetentionPolicy::Recreate => {
                tracing::debug!(module = id, "module discarded");
            }
            RetentionPolicy::KeepAlive => {
                slot.lifecycle = Lifecycle::Hidden;
                self.slots.insert(index, slot);
                tracing::debug!(module = id, "module hidden");
            }
        }
    }

    fn display_name(&self, id: &str) -> String {
        self.registry
            .resolve(id)
            .map(|d| d.display_name().to_string())
            .unwrap_or_else(|_| id.to_string())
    }

    /// Deliver queued messages in publish order until the outbox is empty.
    fn flush_outbox(&mut self) {
        while let Some(message) = self.services.outbox.pop() {
            if message.is(topics::ACTIVATE) {
                self.observe_activate(&message);
            }
            let delivery = self.deliver(&message);
            if delivery.subscribers() == 0 {
                tracing::debug!(topic = message.topic(), "no live subscribers, message dropped");
            }
        }
        for notice in self.services.notices.drain(..) {
            self.state.push_status(notice);
        }
    }

    fn observe_activate(&mut self, message: &BusMessage) {
        match message.payload::<String>() {
            Some(target) if self.registry.position(target).is_some() => {
                if !self.state.is_active(target) {
                    let target = target.clone();
                    self.activate(&target);
                }
            }
            Some(target) => {
                tracing::warn!(target = %target, "activation requested for unknown module");
            }
            None => tracing::warn!("activation message without a module id"),
        }
    }

    fn deliver(&mut self, message: &BusMessage) -> Delivery {
        let mut delivery = Delivery::default();
        for slot in self.slots.values_mut() {
            let mut cx = ModuleContext::new(&slot.id, &mut self.services);
            match slot.module.on_message(message, &mut cx) {
                Ok(()) => delivery.delivered += 1,
                Err(err) => {
                    delivery.failed += 1;
                    tracing::warn!(
                        module = %slot.id,
                        topic = message.topic(),
                        error = %err,
                        "subscriber failed"
                    );
                }
            }
        }
        delivery
    }
}

impl Drop for Shell {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModuleError;
    use crate::registry::ModuleDescriptor;
    use crossbeam_channel::unbounded;

    struct Quiet;

    impl FeatureModule for Quiet {
        fn mount(&mut self, cx: &mut ModuleContext<'_>) -> Result<(), ModuleMountError> {
            let notice = format!("{} up", cx.module_id());
            cx.notify(notice);
            Ok(())
        }
        fn unmount(&mut self, _cx: &mut ModuleContext<'_>) {}
        fn on_message(&mut self, _m: &BusMessage, _cx: &mut ModuleContext<'_>) -> Result<(), ModuleError> {
            Ok(())
        }
        fn on_task_event(&mut self, _e: BackendEvent, _cx: &mut ModuleContext<'_>) {}
        fn ui(&mut self, _ui: &mut egui::Ui, _cx: &mut ModuleContext<'_>) {}
    }

    struct Broken;

    impl FeatureModule for Broken {
        fn mount(&mut self, _cx: &mut ModuleContext<'_>) -> Result<(), ModuleMountError> {
            Err(ModuleMountError::new("broken", "missing codec"))
        }
        fn unmount(&mut self, _cx: &mut ModuleContext<'_>) {}
        fn on_message(&mut self, _m: &BusMessage, _cx: &mut ModuleContext<'_>) -> Result<(), ModuleError> {
            Ok(())
        }
        fn on_task_event(&mut self, _e: BackendEvent, _cx: &mut ModuleContext<'_>) {}
        fn ui(&mut self, _ui: &mut egui::Ui, _cx: &mut ModuleContext<'_>) {}
    }

    fn shell(policy: RetentionPolicy) -> Shell {
        let mut registry = ModuleRegistry::new();
        registry
            .register(ModuleDescriptor::new("quiet", "Quiet", "", || Box::new(Quiet)))
            .unwrap();
        registry
            .register(ModuleDescriptor::new("broken", "Broken", "", || Box::new(Broken)))
            .unwrap();
        let (action_tx, _) = unbounded();
        let (event_tx, _) = unbounded();
        Shell::new(registry, policy, TaskDispatcher::new(action_tx, event_tx))
    }

    #[test]
    fn test_starts_on_home() {
        let shell = shell(RetentionPolicy::Recreate);
        assert_eq!(shell.active_module(), None);
        assert_eq!(shell.live_count(), 0);
        assert_eq!(shell.state().navigation_order, vec!["quiet", "broken"]);
    }

    #[test]
    fn test_notices_become_status_messages() {
        let mut shell = shell(RetentionPolicy::Recreate);
        shell.select("quiet").unwrap();
        assert!(shell
            .state()
            .status_messages
            .iter()
            .any(|(text, _)| text == "quiet up"));
    }

    #[test]
    fn test_dismiss_mount_error() {
        let mut shell = shell(RetentionPolicy::Recreate);
        shell.select("broken").unwrap();
        assert_eq!(shell.mount_error().map(|e| e.reason.as_str()), Some("missing codec"));
        shell.dismiss_mount_error();
        assert!(shell.mount_error().is_none());
        assert_eq!(shell.live_count(), 0);
    }

    #[test]
    fn test_same_policy_is_noop() {
        let mut shell = shell(RetentionPolicy::KeepAlive);
        shell.select("quiet").unwrap();
        shell.go_home();
        shell.set_retention_policy(RetentionPolicy::KeepAlive);
        assert_eq!(shell.lifecycle("quiet"), Some(Lifecycle::Hidden));
        assert_eq!(shell.retention_policy(), RetentionPolicy::KeepAlive);
    }

    #[test]
    fn test_shutdown_clears_outbox() {
        let mut shell = shell(RetentionPolicy::Recreate);
        shell.select("quiet").unwrap();
        shell.services.outbox.push(BusMessage::signal("late"));
        shell.shutdown();
        assert!(shell.services.outbox.is_empty());
        assert_eq!(shell.active_module(), None);
    }
}
