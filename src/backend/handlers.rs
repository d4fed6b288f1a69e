//! Task bodies for worker actions.
//!
//! Every task races its work against a cancellation token; a cancelled
//! task sends nothing back.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossbeam_channel::Sender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::chat::ChatService;
use crate::error::{FileAccessError, MediaError};
use crate::media::{self, PdfInfo};
use crate::protocol::{BackendAction, BackendEvent, TaskId};

/// A spawned task and the token that stops it.
pub(super) struct RunningTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl RunningTask {
    pub(super) fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Dispatch one action from the UI. `Shutdown` is handled by the caller.
pub(super) fn handle_action(
    action: BackendAction,
    running: &mut HashMap<TaskId, RunningTask>,
    event_tx: &Sender<BackendEvent>,
    chat: &Arc<dyn ChatService>,
) {
    match action {
        BackendAction::LoadFile { task, path } => {
            spawn_task(task, running, event_tx.clone(), async move {
                let result = load_file(&path).await;
                BackendEvent::FileLoaded { task, path, result }
            });
        }
        BackendAction::SaveFile { task, path, bytes } => {
            spawn_task(task, running, event_tx.clone(), async move {
                let result = save_file(&path, &bytes).await;
                BackendEvent::FileSaved { task, path, result }
            });
        }
        BackendAction::DecodeImage { task, path } => {
            spawn_task(task, running, event_tx.clone(), async move {
                let result = decode_image(path.clone()).await;
                BackendEvent::ImageDecoded { task, path, result }
            });
        }
        BackendAction::InspectPdf { task, path } => {
            spawn_task(task, running, event_tx.clone(), async move {
                let result = inspect_pdf(path.clone()).await;
                BackendEvent::PdfInspected { task, path, result }
            });
        }
        BackendAction::Chat { task, request } => {
            let chat = Arc::clone(chat);
            spawn_task(task, running, event_tx.clone(), async move {
                let result = chat.complete(request).await;
                BackendEvent::ChatReply { task, result }
            });
        }
        BackendAction::Cancel(task) => {
            if let Some(running_task) = running.remove(&task) {
                running_task.token.cancel();
                tracing::debug!(?task, "task cancelled");
            }
        }
        BackendAction::Configure(settings) => {
            tracing::info!(model = %settings.model, "chat backend reconfigured");
            chat.configure(settings);
        }
        BackendAction::Shutdown => {}
    }
}

pub(super) fn cancel_all(running: &mut HashMap<TaskId, RunningTask>) {
    for (_, task) in running.drain() {
        task.token.cancel();
    }
}

fn spawn_task<F>(
    task: TaskId,
    running: &mut HashMap<TaskId, RunningTask>,
    event_tx: Sender<BackendEvent>,
    work: F,
) where
    F: Future<Output = BackendEvent> + Send + 'static,
{
    let token = CancellationToken::new();
    let cancelled = token.clone();
    let handle = tokio::spawn(async move {
        tokio::select! {
            _ = cancelled.cancelled() => {}
            event = work => {
                // UI gone: nothing left to notify
                let _ = event_tx.send(event);
            }
        }
    });
    running.insert(task, RunningTask { token, handle });
}

async fn load_file(path: &Path) -> Result<Vec<u8>, FileAccessError> {
    tokio::fs::read(path)
        .await
        .map_err(|source| FileAccessError::new(path, source))
}

async fn save_file(path: &Path, bytes: &[u8]) -> Result<(), FileAccessError> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|source| FileAccessError::new(path, source))
}

async fn decode_image(path: PathBuf) -> Result<eframe::egui::ColorImage, MediaError> {
    let bytes = load_file(&path).await?;
    let decoded = tokio::task::spawn_blocking(move || media::decode_image(&bytes)).await;
    match decoded {
        Ok(Ok(pixels)) => {
            tracing::debug!(path = %path.display(), size = ?pixels.size, "image decoded");
            Ok(pixels)
        }
        Ok(Err(source)) => Err(MediaError::Image { path, source }),
        Err(e) => {
            tracing::error!(path = %path.display(), "image decoder panicked: {}", e);
            Err(MediaError::Interrupted { path })
        }
    }
}

async fn inspect_pdf(path: PathBuf) -> Result<PdfInfo, MediaError> {
    let bytes = load_file(&path).await?;
    let inspected = tokio::task::spawn_blocking(move || media::inspect_pdf(&bytes)).await;
    match inspected {
        Ok(Ok(info)) => {
            tracing::debug!(path = %path.display(), pages = info.pages, "pdf inspected");
            Ok(info)
        }
        Ok(Err(source)) => Err(MediaError::Pdf { path, source }),
        Err(e) => {
            tracing::error!(path = %path.display(), "pdf inspection panicked: {}", e);
            Err(MediaError::Interrupted { path })
        }
    }
}
