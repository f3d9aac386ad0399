use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlError(String),
    #[error("Missing value: {0}")]
    MissingValue(String),
    #[error("Value out of range: {0}")]
    NotInRange(String),
}

/// Failure reported by a remote storage backend.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Remote transport error: {0}")]
    Transport(String),
    #[error("Remote returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Unexpected remote payload: {0}")]
    Decode(String),
    #[error("Remote credentials unusable: {0}")]
    Credentials(String),
}

impl RemoteError {
    /// HTTP status of the failed call, when the remote answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(code) => RemoteError::Status {
                status: code.as_u16(),
                body: err.to_string(),
            },
            None if err.is_decode() => RemoteError::Decode(err.to_string()),
            None => RemoteError::Transport(err.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Remote folder lookup for '{name}' failed: {source}")]
    RemoteUnavailable {
        name: String,
        #[source]
        source: RemoteError,
    },
}

#[derive(Debug, Error)]
pub enum FrameStoreError {
    #[error("Local write failed for {path}: {reason}")]
    LocalWriteFailed { path: PathBuf, reason: String },
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Frame source missing or empty: {0}")]
    SourceMissing(PathBuf),
    #[error("Upload failed (status {status:?}): {source}")]
    UploadFailed {
        status: Option<u16>,
        #[source]
        source: RemoteError,
    },
}

impl From<RemoteError> for UploadError {
    fn from(source: RemoteError) -> Self {
        UploadError::UploadFailed {
            status: source.status(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Capture device {index} could not be opened: {reason}")]
    OpenFailed { index: u32, reason: String },
    #[error("Capture device read failed: {0}")]
    ReadFailed(String),
    #[error("Capture device used before open")]
    NotOpen,
}

#[derive(Debug, Error)]
pub enum SessionSourceError {
    #[error("Session source request failed: {0}")]
    Request(String),
    #[error("Session source returned status {0}")]
    Status(u16),
    #[error("Session source payload invalid: {0}")]
    Payload(String),
    #[error("Invalid session identifier '{0}'")]
    InvalidIdentifier(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session source unavailable: {0}")]
    SessionSourceUnavailable(#[from] SessionSourceError),
    #[error("{0}")]
    RemoteUnavailable(#[from] ResolveError),
    #[error("Local session directory unavailable: {0}")]
    LocalDirectory(#[from] FrameStoreError),
    #[error("Device failure: {0}")]
    DeviceFailure(#[from] DeviceError),
    #[error("Operation not allowed while the session is {0}")]
    InvalidState(String),
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Configuration error: {0}")]
    ConfigurationError(#[from] ConfigError),
    #[error("Session error: {0}")]
    SessionError(#[from] SessionError),
    #[error("Remote error: {0}")]
    RemoteError(#[from] RemoteError),
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),
}
