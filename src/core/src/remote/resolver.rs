use std::sync::Arc;

use log::{debug, info, warn};

use crate::error_handling::types::ResolveError;
use crate::remote::client::RemoteStorage;
use crate::remote::types::{RemoteFolder, RemoteId};
use crate::session_management::session::SessionKey;

/// Finds or creates the remote folder backing a session.
///
/// Lookup is restricted to the immediate children of the parent and matches
/// on exact name equality. When the remote reports several folders with the
/// same name, the first one in remote order wins; no tie-break is attempted.
pub struct FolderResolver {
    remote: Arc<dyn RemoteStorage>,
}

impl FolderResolver {
    pub fn new(remote: Arc<dyn RemoteStorage>) -> Self {
        Self { remote }
    }

    pub async fn resolve(
        &self,
        key: &SessionKey,
        parent_id: &RemoteId,
    ) -> Result<RemoteFolder, ResolveError> {
        let name = key.as_str();
        let unavailable = |source| ResolveError::RemoteUnavailable {
            name: name.to_string(),
            source,
        };

        let mut matches = self
            .remote
            .find_folders(name, parent_id)
            .await
            .map_err(unavailable)?
            .into_iter()
            .filter(|entry| entry.name == name);

        if let Some(first) = matches.next() {
            let others = matches.count();
            if others > 0 {
                warn!(
                    "{} remote folders named '{}' under {}, using {}",
                    others + 1,
                    name,
                    parent_id,
                    first.id
                );
            }
            debug!("Reusing remote folder {} for session {}", first.id, name);
            return Ok(RemoteFolder {
                id: first.id,
                name: first.name,
                parent_id: parent_id.clone(),
            });
        }

        let id = self
            .remote
            .create_folder(name, Some(parent_id))
            .await
            .map_err(unavailable)?;
        info!("Created remote folder {} for session {} under {}", id, name, parent_id);
        Ok(RemoteFolder {
            id,
            name: name.to_string(),
            parent_id: parent_id.clone(),
        })
    }
}
