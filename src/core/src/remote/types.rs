//! Value types exchanged with the remote storage service.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Opaque handle the remote service assigns to a folder or file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteId(String);

impl RemoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A folder entry as listed by the remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    pub id: RemoteId,
    pub name: String,
}

/// Remote container canonical for a `(name, parent_id)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFolder {
    pub id: RemoteId,
    pub name: String,
    pub parent_id: RemoteId,
}

/// Outcome of a single frame upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded { remote_object_id: RemoteId },
    Failed { reason: String },
}

/// Per-frame upload record; only logged and counted, never persisted.
#[derive(Debug, Clone)]
pub struct UploadResult {
    pub file_name: String,
    pub local_path: PathBuf,
    pub outcome: UploadOutcome,
}

impl UploadResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, UploadOutcome::Uploaded { .. })
    }
}
