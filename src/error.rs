use crate::core::download::Stage;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, InstallError>;

#[derive(Error, Debug)]
pub enum InstallError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Invalid version: '{version}'")]
    InvalidVersion { version: String },

    #[error("Already installed: {path}")]
    AlreadyInstalled { path: PathBuf },

    #[error("{stage} stage: could not start {program}: {source}")]
    Spawn {
        stage: Stage,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{stage} stage: {program} exited with {status}")]
    ProcessFailed {
        stage: Stage,
        program: String,
        status: ExitStatus,
    },

    #[error("Download failed: {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Download failed: {url}: HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Unsupported archive entry {kind} at {path}")]
    UnsupportedEntry { path: PathBuf, kind: String },

    #[error("Refusing to extract unsafe path: {path}")]
    UnsafePath { path: PathBuf },

    #[error("Archive has no 'go' root directory: {path}")]
    MissingArchiveRoot { path: PathBuf },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Worker for {target} panicked")]
    WorkerPanicked { target: String },

    #[error("{failed} of {total} targets failed")]
    FailedTargets { failed: usize, total: usize },
}

impl InstallError {
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        InstallError::Config {
            message: message.into(),
        }
    }

    /// Maps permission failures on `path` to `PermissionDenied`, everything
    /// else to `Io`.
    pub fn from_io_at(error: std::io::Error, path: &std::path::Path) -> Self {
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => InstallError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => InstallError::from(error),
        }
    }
}
