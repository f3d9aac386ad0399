//! Remote Storage trait
//!
//! The capture pipeline only needs three operations from the remote
//! hierarchical store. Implementors are expected to hold an already
//! authenticated handle; credential bootstrap happens elsewhere.

use async_trait::async_trait;

use crate::error_handling::types::RemoteError;
use crate::remote::types::{RemoteEntry, RemoteId};

/// Media type the remote uses to mark an entry as a folder.
pub const FOLDER_MEDIA_TYPE: &str = "application/vnd.google-apps.folder";

#[async_trait]
pub trait RemoteStorage: Send + Sync {
    /// Lists folders named `name` directly under `parent`, in remote order.
    async fn find_folders(
        &self,
        name: &str,
        parent: &RemoteId,
    ) -> Result<Vec<RemoteEntry>, RemoteError>;

    /// Creates a folder. `parent = None` places it at the remote's top level.
    async fn create_folder(
        &self,
        name: &str,
        parent: Option<&RemoteId>,
    ) -> Result<RemoteId, RemoteError>;

    /// Stores `content` as a new file under `parent`.
    async fn create_file(
        &self,
        name: &str,
        parent: &RemoteId,
        media_type: &str,
        content: Vec<u8>,
    ) -> Result<RemoteId, RemoteError>;
}
