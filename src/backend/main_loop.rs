//! Worker event loop on a tokio runtime.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use tokio::runtime::Builder;

use super::chat::ChatService;
use super::handlers::{self, RunningTask};
use crate::protocol::{BackendAction, BackendEvent, TaskId};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Run the worker loop until `Shutdown` arrives or the UI drops its sender.
pub fn run_backend(
    action_rx: Receiver<BackendAction>,
    event_tx: Sender<BackendEvent>,
    chat: Arc<dyn ChatService>,
) {
    let rt = match Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("deskhub-worker")
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create Tokio runtime: {}", e);
            return;
        }
    };

    rt.block_on(async move {
        let mut running: HashMap<TaskId, RunningTask> = HashMap::new();
        tracing::info!("background worker started");

        loop {
            // Drain actions from the UI (non-blocking)
            loop {
                match action_rx.try_recv() {
                    Ok(BackendAction::Shutdown) => {
                        handlers::cancel_all(&mut running);
                        tracing::info!("background worker stopped");
                        return;
                    }
                    Ok(action) => handlers::handle_action(action, &mut running, &event_tx, &chat),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        handlers::cancel_all(&mut running);
                        tracing::info!("UI gone, background worker stopped");
                        return;
                    }
                }
            }

            running.retain(|_, task| !task.is_finished());
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AiSettings;
    use crate::error::{ExternalServiceError, MediaError};
    use crate::protocol::{ChatRequest, ChatRole, ChatTurn};
    use async_trait::async_trait;
    use crossbeam_channel::unbounded;
    use std::sync::Mutex;
    use std::thread;

    const WAIT: Duration = Duration::from_secs(5);

    /// Replies with the message count, or stalls when asked to.
    struct ScriptedChat {
        configured: Mutex<Option<String>>,
    }

    #[async_trait]
    impl ChatService for ScriptedChat {
        async fn complete(&self, request: ChatRequest) -> Result<String, ExternalServiceError> {
            if request.message == "stall" {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            Ok(format!("{} turns + {}", request.history.len(), request.message))
        }

        fn configure(&self, settings: AiSettings) {
            *self.configured.lock().unwrap() = Some(settings.model);
        }
    }

    fn start() -> (
        Sender<BackendAction>,
        Receiver<BackendEvent>,
        Arc<ScriptedChat>,
        thread::JoinHandle<()>,
    ) {
        let (action_tx, action_rx) = unbounded();
        let (event_tx, event_rx) = unbounded();
        let chat = Arc::new(ScriptedChat {
            configured: Mutex::new(None),
        });
        let worker_chat: Arc<dyn ChatService> = chat.clone();
        let handle = thread::spawn(move || run_backend(action_rx, event_tx, worker_chat));
        (action_tx, event_rx, chat, handle)
    }

    #[test]
    fn test_load_and_save_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        let (action_tx, event_rx, _chat, handle) = start();

        action_tx
            .send(BackendAction::SaveFile {
                task: TaskId(1),
                path: path.clone(),
                bytes: b"hello".to_vec(),
            })
            .unwrap();
        match event_rx.recv_timeout(WAIT).unwrap() {
            BackendEvent::FileSaved { task, result, .. } => {
                assert_eq!(task, TaskId(1));
                assert!(result.is_ok());
            }
            other => panic!("unexpected event: {:?}", other),
        }

        action_tx
            .send(BackendAction::LoadFile {
                task: TaskId(2),
                path: path.clone(),
            })
            .unwrap();
        match event_rx.recv_timeout(WAIT).unwrap() {
            BackendEvent::FileLoaded { task, result, path: p } => {
                assert_eq!(task, TaskId(2));
                assert_eq!(p, path);
                assert_eq!(result.unwrap(), b"hello".to_vec());
            }
            other => panic!("unexpected event: {:?}", other),
        }

        action_tx.send(BackendAction::Shutdown).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_documents_are_decoded_on_the_worker() {
        let dir = tempfile::tempdir().unwrap();
        let picture = dir.path().join("red.png");
        let report = dir.path().join("report.pdf");
        let bogus = dir.path().join("bogus.png");
        std::fs::write(&picture, crate::media::fixtures::png(4, 3)).unwrap();
        std::fs::write(&report, crate::media::fixtures::TWO_PAGES).unwrap();
        std::fs::write(&bogus, b"not an image").unwrap();
        let (action_tx, event_rx, _chat, handle) = start();

        action_tx
            .send(BackendAction::DecodeImage {
                task: TaskId(1),
                path: picture,
            })
            .unwrap();
        match event_rx.recv_timeout(WAIT).unwrap() {
            BackendEvent::ImageDecoded { task, result, .. } => {
                assert_eq!(task, TaskId(1));
                assert_eq!(result.unwrap().size, [4, 3]);
            }
            other => panic!("unexpected event: {:?}", other),
        }

        action_tx
            .send(BackendAction::InspectPdf {
                task: TaskId(2),
                path: report,
            })
            .unwrap();
        match event_rx.recv_timeout(WAIT).unwrap() {
            BackendEvent::PdfInspected { task, result, .. } => {
                assert_eq!(task, TaskId(2));
                assert_eq!(result.unwrap().pages, 2);
            }
            other => panic!("unexpected event: {:?}", other),
        }

        action_tx
            .send(BackendAction::DecodeImage {
                task: TaskId(3),
                path: bogus,
            })
            .unwrap();
        match event_rx.recv_timeout(WAIT).unwrap() {
            BackendEvent::ImageDecoded { result, .. } => {
                let err = result.unwrap_err();
                assert!(matches!(err, MediaError::Image { .. }));
                assert!(err.to_string().contains("bogus.png"));
            }
            other => panic!("unexpected event: {:?}", other),
        }

        action_tx.send(BackendAction::Shutdown).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_missing_file_reports_access_error() {
        let dir = tempfile::tempdir().unwrap();
        let (action_tx, event_rx, _chat, handle) = start();

        action_tx
            .send(BackendAction::LoadFile {
                task: TaskId(9),
                path: dir.path().join("absent.txt"),
            })
            .unwrap();
        match event_rx.recv_timeout(WAIT).unwrap() {
            BackendEvent::FileLoaded { result, .. } => {
                let err = result.unwrap_err();
                assert_eq!(err.source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected event: {:?}", other),
        }

        action_tx.send(BackendAction::Shutdown).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_chat_reply_and_cancellation() {
        let (action_tx, event_rx, chat, handle) = start();

        action_tx
            .send(BackendAction::Chat {
                task: TaskId(1),
                request: ChatRequest {
                    history: vec![],
                    message: "stall".into(),
                },
            })
            .unwrap();
        action_tx.send(BackendAction::Cancel(TaskId(1))).unwrap();

        action_tx
            .send(BackendAction::Chat {
                task: TaskId(2),
                request: ChatRequest {
                    history: vec![ChatTurn::new(ChatRole::User, "hi")],
                    message: "again".into(),
                },
            })
            .unwrap();

        match event_rx.recv_timeout(WAIT).unwrap() {
            BackendEvent::ChatReply { task, result } => {
                assert_eq!(task, TaskId(2));
                assert_eq!(result.unwrap(), "1 turns + again");
            }
            other => panic!("unexpected event: {:?}", other),
        }
        // The cancelled request never answers
        assert!(event_rx.recv_timeout(Duration::from_millis(200)).is_err());

        let mut settings = AiSettings::default();
        settings.model = "gpt-4o".into();
        action_tx.send(BackendAction::Configure(settings)).unwrap();
        action_tx.send(BackendAction::Shutdown).unwrap();
        handle.join().unwrap();
        assert_eq!(chat.configured.lock().unwrap().as_deref(), Some("gpt-4o"));
    }

    #[test]
    fn test_worker_stops_when_ui_drops_sender() {
        let (action_tx, _event_rx, _chat, handle) = start();
        drop(action_tx);
        handle.join().unwrap();
    }
}
