//! In-memory `RemoteStorage` used by the test suites.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error_handling::types::RemoteError;
use crate::remote::client::RemoteStorage;
use crate::remote::types::{RemoteEntry, RemoteId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFolder {
    pub id: RemoteId,
    pub name: String,
    pub parent: Option<RemoteId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub id: RemoteId,
    pub name: String,
    pub parent: RemoteId,
    pub media_type: String,
    pub size: usize,
}

#[derive(Default)]
struct State {
    folders: Vec<StoredFolder>,
    files: Vec<StoredFile>,
    upload_attempts: usize,
    lookups: usize,
    next_folder: usize,
    next_file: usize,
}

/// Records every call; folder ids are `F1, F2, ...`, file ids `O1, O2, ...`.
#[derive(Default)]
pub struct MemoryRemote {
    state: Mutex<State>,
    offline: bool,
    failing_uploads: HashSet<usize>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with a transport error.
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    /// Upload attempts with these 1-based ordinals fail with HTTP 503.
    pub fn failing_uploads(attempts: &[usize]) -> Self {
        Self {
            failing_uploads: attempts.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn with_folder(self, id: &str, name: &str, parent: &str) -> Self {
        self.state.lock().unwrap().folders.push(StoredFolder {
            id: RemoteId::new(id),
            name: name.to_string(),
            parent: Some(RemoteId::new(parent)),
        });
        self
    }

    pub fn folders(&self) -> Vec<StoredFolder> {
        self.state.lock().unwrap().folders.clone()
    }

    pub fn files(&self) -> Vec<StoredFile> {
        self.state.lock().unwrap().files.clone()
    }

    pub fn upload_attempts(&self) -> usize {
        self.state.lock().unwrap().upload_attempts
    }

    pub fn lookups(&self) -> usize {
        self.state.lock().unwrap().lookups
    }

    fn check_online(&self) -> Result<(), RemoteError> {
        if self.offline {
            return Err(RemoteError::Transport("remote unreachable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStorage for MemoryRemote {
    async fn find_folders(
        &self,
        name: &str,
        parent: &RemoteId,
    ) -> Result<Vec<RemoteEntry>, RemoteError> {
        self.check_online()?;
        let mut state = self.state.lock().unwrap();
        state.lookups += 1;
        Ok(state
            .folders
            .iter()
            .filter(|f| f.name == name && f.parent.as_ref() == Some(parent))
            .map(|f| RemoteEntry {
                id: f.id.clone(),
                name: f.name.clone(),
            })
            .collect())
    }

    async fn create_folder(
        &self,
        name: &str,
        parent: Option<&RemoteId>,
    ) -> Result<RemoteId, RemoteError> {
        self.check_online()?;
        let mut state = self.state.lock().unwrap();
        state.next_folder += 1;
        let id = RemoteId::new(format!("F{}", state.next_folder));
        state.folders.push(StoredFolder {
            id: id.clone(),
            name: name.to_string(),
            parent: parent.cloned(),
        });
        Ok(id)
    }

    async fn create_file(
        &self,
        name: &str,
        parent: &RemoteId,
        media_type: &str,
        content: Vec<u8>,
    ) -> Result<RemoteId, RemoteError> {
        self.check_online()?;
        let mut state = self.state.lock().unwrap();
        state.upload_attempts += 1;
        if self.failing_uploads.contains(&state.upload_attempts) {
            return Err(RemoteError::Status {
                status: 503,
                body: "backend unavailable".into(),
            });
        }
        state.next_file += 1;
        let id = RemoteId::new(format!("O{}", state.next_file));
        state.files.push(StoredFile {
            id: id.clone(),
            name: name.to_string(),
            parent: parent.clone(),
            media_type: media_type.to_string(),
            size: content.len(),
        });
        Ok(id)
    }
}
