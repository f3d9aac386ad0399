use std::path::Path;
use std::sync::Arc;

use log::{debug, info};

use crate::error_handling::types::UploadError;
use crate::remote::client::RemoteStorage;
use crate::remote::types::RemoteId;

/// Extension every uploaded frame carries on the remote side.
pub const FRAME_EXTENSION: &str = "jpg";

/// Sends locally persisted frames to a remote folder.
///
/// Holds no state besides the remote handle. Failures are returned to the
/// caller, which decides whether to skip the frame; nothing is retried here.
pub struct Uploader {
    remote: Arc<dyn RemoteStorage>,
}

impl Uploader {
    pub fn new(remote: Arc<dyn RemoteStorage>) -> Self {
        Self { remote }
    }

    pub async fn upload(
        &self,
        local_path: &Path,
        remote_folder_id: &RemoteId,
    ) -> Result<RemoteId, UploadError> {
        let missing = || UploadError::SourceMissing(local_path.to_path_buf());

        // The frame store already checked the file, but it may have been
        // removed since; never hand a missing file to the transport.
        match std::fs::metadata(local_path) {
            Ok(meta) if meta.is_file() && meta.len() > 0 => {}
            _ => return Err(missing()),
        }
        let content = std::fs::read(local_path).map_err(|_| missing())?;
        if content.is_empty() {
            return Err(missing());
        }

        let name = remote_name(local_path).ok_or_else(missing)?;
        let media_type = mime_guess::from_path(&name)
            .first()
            .filter(|mime| mime.type_() == mime_guess::mime::IMAGE)
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_else(|| "image/jpeg".to_string());

        debug!(
            "Uploading {} ({} bytes, {}) to folder {}",
            name,
            content.len(),
            media_type,
            remote_folder_id
        );
        let id = self
            .remote
            .create_file(&name, remote_folder_id, &media_type, content)
            .await?;
        info!("Uploaded {} with remote id {}", name, id);
        Ok(id)
    }
}

/// Base file name with the frame extension enforced.
fn remote_name(local_path: &Path) -> Option<String> {
    let stem = local_path.file_stem()?.to_str()?;
    if stem.is_empty() {
        return None;
    }
    Some(format!("{}.{}", stem, FRAME_EXTENSION))
}
