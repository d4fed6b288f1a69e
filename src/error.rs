//! Error taxonomy for the shell and its modules.
//!
//! Only [`ConfigError`] is fatal, and only at startup. Everything else is
//! contained inside the module that produced it and surfaced inline.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Registry misconfiguration: duplicate or unknown module identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("module identifier `{0}` is already registered")]
    DuplicateIdentifier(String),

    #[error("no module registered under `{0}`")]
    UnknownModule(String),
}

/// A module failed to initialize while being activated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("module `{module}` failed to start: {reason}")]
pub struct ModuleMountError {
    pub module: String,
    pub reason: String,
}

impl ModuleMountError {
    pub fn new(module: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            reason: reason.into(),
        }
    }
}

/// Failure talking to the language-model backend.
#[derive(Debug, Error)]
pub enum ExternalServiceError {
    #[error("no API key configured (set one in Settings or OPENAI_API_KEY)")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("background worker is not running")]
    WorkerUnavailable,
}

/// A document could not be read or written.
#[derive(Debug, Error)]
#[error("cannot access {}: {source}", .path.display())]
pub struct FileAccessError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl FileAccessError {
    pub fn new(path: &Path, source: io::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn worker_unavailable(path: &Path) -> Self {
        Self::new(
            path,
            io::Error::new(io::ErrorKind::BrokenPipe, "background worker is not running"),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PdfError {
    #[error("not a PDF document (missing %PDF- header)")]
    NotPdf,
}

/// A document was read but could not be turned into something viewable.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error(transparent)]
    FileAccess(#[from] FileAccessError),

    #[error("{} is not a readable image: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{}: {source}", .path.display())]
    Pdf {
        path: PathBuf,
        #[source]
        source: PdfError,
    },

    #[error("decoding {} stopped unexpectedly", .path.display())]
    Interrupted { path: PathBuf },
}

impl MediaError {
    pub(crate) fn worker_unavailable(path: &Path) -> Self {
        Self::FileAccess(FileAccessError::worker_unavailable(path))
    }
}

/// Failure raised by a module while handling a bus message.
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("unexpected payload for topic `{0}`")]
    UnexpectedPayload(String),

    #[error(transparent)]
    FileAccess(#[from] FileAccessError),

    #[error("{0}")]
    Other(String),
}

/// Errors returned by shell navigation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShellError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}
