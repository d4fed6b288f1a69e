//! Event processing from the worker

use super::DeskApp;

impl DeskApp {
    /// Drain worker results and hand each to the shell for routing.
    /// Returns how many events were processed.
    pub fn process_events(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(event) = self.event_rx.try_recv() {
            self.shell.handle_task_event(event);
            processed += 1;
        }
        processed
    }
}
