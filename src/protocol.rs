//! Channel protocol between the UI thread and the background worker.

use std::path::PathBuf;

use eframe::egui;

use crate::config::AiSettings;
use crate::error::{ExternalServiceError, FileAccessError, MediaError};
use crate::media::PdfInfo;

/// Identifies one submitted background task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

/// Who said a line of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One line of a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
    /// Local time the turn was added (HH:MM)
    pub timestamp: String,
}

impl ChatTurn {
    pub fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: chrono::Local::now().format("%H:%M").to_string(),
        }
    }
}

/// Conversation history plus the new user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub history: Vec<ChatTurn>,
    pub message: String,
}

/// Actions sent from the UI to the worker
#[derive(Debug)]
pub enum BackendAction {
    /// Read a whole file
    LoadFile { task: TaskId, path: PathBuf },
    /// Write (create or truncate) a file
    SaveFile {
        task: TaskId,
        path: PathBuf,
        bytes: Vec<u8>,
    },
    /// Read and decode an image into RGBA pixels
    DecodeImage { task: TaskId, path: PathBuf },
    /// Read a PDF and pull out its version and page count
    InspectPdf { task: TaskId, path: PathBuf },
    /// Ask the language model for the next assistant message
    Chat { task: TaskId, request: ChatRequest },
    /// Abandon a running task; its result is never delivered
    Cancel(TaskId),
    /// Replace the chat backend configuration
    Configure(AiSettings),
    /// Stop the worker loop
    Shutdown,
}

impl BackendAction {
    pub fn task(&self) -> Option<TaskId> {
        match self {
            Self::LoadFile { task, .. }
            | Self::SaveFile { task, .. }
            | Self::DecodeImage { task, .. }
            | Self::InspectPdf { task, .. }
            | Self::Chat { task, .. } => Some(*task),
            Self::Cancel(_) | Self::Configure(_) | Self::Shutdown => None,
        }
    }

    /// The event a task action resolves to when the worker cannot be reached.
    pub(crate) fn into_unavailable_event(self) -> Option<BackendEvent> {
        match self {
            Self::LoadFile { task, path } => Some(BackendEvent::FileLoaded {
                task,
                result: Err(FileAccessError::worker_unavailable(&path)),
                path,
            }),
            Self::SaveFile { task, path, .. } => Some(BackendEvent::FileSaved {
                task,
                result: Err(FileAccessError::worker_unavailable(&path)),
                path,
            }),
            Self::DecodeImage { task, path } => Some(BackendEvent::ImageDecoded {
                task,
                result: Err(MediaError::worker_unavailable(&path)),
                path,
            }),
            Self::InspectPdf { task, path } => Some(BackendEvent::PdfInspected {
                task,
                result: Err(MediaError::worker_unavailable(&path)),
                path,
            }),
            Self::Chat { task, .. } => Some(BackendEvent::ChatReply {
                task,
                result: Err(ExternalServiceError::WorkerUnavailable),
            }),
            Self::Cancel(_) | Self::Configure(_) | Self::Shutdown => None,
        }
    }
}

/// Results sent from the worker back to the UI
#[derive(Debug)]
pub enum BackendEvent {
    FileLoaded {
        task: TaskId,
        path: PathBuf,
        result: Result<Vec<u8>, FileAccessError>,
    },
    FileSaved {
        task: TaskId,
        path: PathBuf,
        result: Result<(), FileAccessError>,
    },
    ImageDecoded {
        task: TaskId,
        path: PathBuf,
        result: Result<egui::ColorImage, MediaError>,
    },
    PdfInspected {
        task: TaskId,
        path: PathBuf,
        result: Result<PdfInfo, MediaError>,
    },
    ChatReply {
        task: TaskId,
        result: Result<String, ExternalServiceError>,
    },
}

impl BackendEvent {
    pub fn task(&self) -> TaskId {
        match self {
            Self::FileLoaded { task, .. }
            | Self::FileSaved { task, .. }
            | Self::ImageDecoded { task, .. }
            | Self::PdfInspected { task, .. }
            | Self::ChatReply { task, .. } => *task,
        }
    }
}
