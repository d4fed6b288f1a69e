//! Background worker: file I/O and language-model calls off the UI thread.
//!
//! - `main_loop`: tokio runtime and action dispatch
//! - `handlers`: per-action task bodies with cancellation
//! - `chat`: the chat completion collaborator
mod chat;
mod handlers;
mod main_loop;

pub use chat::{ChatService, OpenAiChat, SYSTEM_PROMPT};
pub use main_loop::run_backend;

use crossbeam_channel::Sender;

use crate::protocol::{BackendAction, BackendEvent, TaskId};

/// UI-side handle that numbers tasks and hands them to the worker.
///
/// If the worker has gone away, the failure is looped back as the task's
/// result event so the submitting module still hears about it.
pub struct TaskDispatcher {
    action_tx: Sender<BackendAction>,
    loopback: Sender<BackendEvent>,
    next_id: u64,
}

impl TaskDispatcher {
    pub fn new(action_tx: Sender<BackendAction>, loopback: Sender<BackendEvent>) -> Self {
        Self {
            action_tx,
            loopback,
            next_id: 1,
        }
    }

    pub fn submit(&mut self, build: impl FnOnce(TaskId) -> BackendAction) -> TaskId {
        let task = TaskId(self.next_id);
        self.next_id += 1;

        if let Err(err) = self.action_tx.send(build(task)) {
            tracing::error!(?task, "worker unavailable, failing task");
            if let Some(event) = err.into_inner().into_unavailable_event() {
                let _ = self.loopback.send(event);
            }
        }
        task
    }

    pub fn cancel(&self, task: TaskId) {
        let _ = self.action_tx.send(BackendAction::Cancel(task));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::path::PathBuf;

    #[test]
    fn test_submit_numbers_tasks() {
        let (action_tx, action_rx) = unbounded();
        let (event_tx, _event_rx) = unbounded();
        let mut dispatcher = TaskDispatcher::new(action_tx, event_tx);

        let a = dispatcher.submit(|task| BackendAction::LoadFile {
            task,
            path: PathBuf::from("a.txt"),
        });
        let b = dispatcher.submit(|task| BackendAction::LoadFile {
            task,
            path: PathBuf::from("b.txt"),
        });
        assert_ne!(a, b);
        assert_eq!(action_rx.try_recv().unwrap().task(), Some(a));
        assert_eq!(action_rx.try_recv().unwrap().task(), Some(b));
    }

    #[test]
    fn test_submit_without_worker_loops_back_failure() {
        let (action_tx, action_rx) = unbounded();
        let (event_tx, event_rx) = unbounded();
        drop(action_rx);
        let mut dispatcher = TaskDispatcher::new(action_tx, event_tx);

        let task = dispatcher.submit(|task| BackendAction::SaveFile {
            task,
            path: PathBuf::from("out.txt"),
            bytes: b"hi".to_vec(),
        });

        match event_rx.try_recv().unwrap() {
            BackendEvent::FileSaved { task: t, result, .. } => {
                assert_eq!(t, task);
                assert!(result.is_err());
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
