//! Shell state, separated from module instances and UI code.
//!
//! `ShellState` records which module is active and the navigation order.
//! Only the shell mutates it, in response to navigation events.

use std::time::Instant;

#[derive(Debug, Default)]
pub struct ShellState {
    /// Module currently mounted in the display area, if any.
    pub active_module: Option<String>,

    /// Module ids in navigation order (registration order).
    pub navigation_order: Vec<String>,

    /// Status toast messages with creation time (auto-expire).
    pub status_messages: Vec<(String, Instant)>,
}

impl ShellState {
    pub fn new(navigation_order: Vec<String>) -> Self {
        Self {
            active_module: None,
            navigation_order,
            status_messages: Vec::new(),
        }
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active_module.as_deref() == Some(id)
    }

    /// Module after the active one, wrapping around. From home, the first.
    pub fn next_module(&self) -> Option<&str> {
        let len = self.navigation_order.len();
        if len == 0 {
            return None;
        }
        let next = match self.active_index() {
            Some(idx) => (idx + 1) % len,
            None => 0,
        };
        self.navigation_order.get(next).map(String::as_str)
    }

    /// Module before the active one, wrapping around. From home, the last.
    pub fn prev_module(&self) -> Option<&str> {
        let len = self.navigation_order.len();
        if len == 0 {
            return None;
        }
        let prev = match self.active_index() {
            Some(0) | None => len - 1,
            Some(idx) => idx - 1,
        };
        self.navigation_order.get(prev).map(String::as_str)
    }

    /// The `n`th module (zero-based), for Ctrl+1..9.
    pub fn nth_module(&self, n: usize) -> Option<&str> {
        self.navigation_order.get(n).map(String::as_str)
    }

    pub fn push_status(&mut self, text: impl Into<String>) {
        self.status_messages.push((text.into(), Instant::now()));
    }

    /// Purge status messages older than the given duration.
    pub fn purge_old_status_messages(&mut self, max_age_secs: u64) {
        self.status_messages
            .retain(|(_, created)| created.elapsed().as_secs() < max_age_secs);
    }

    fn active_index(&self) -> Option<usize> {
        let active = self.active_module.as_deref()?;
        self.navigation_order.iter().position(|id| id == active)
    }
}
