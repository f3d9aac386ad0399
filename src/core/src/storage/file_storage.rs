use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Local;
use log::{debug, error, info};
use uuid::Uuid;

use crate::error_handling::types::FrameStoreError;
use crate::storage::storage_trait::FrameStore;
use crate::storage::types::FrameRecord;

/// Filesystem-backed frame store.
///
/// Frame names combine a second-resolution timestamp, an in-process counter
/// and a random UUID, so two calls in the same second never collide and a
/// restarted process (counter back at 1) cannot clash with earlier files.
pub struct FileFrameStore {
    sequence: AtomicU64,
}

impl FileFrameStore {
    pub fn new() -> Self {
        Self {
            sequence: AtomicU64::new(0),
        }
    }

    /// Number of frames named so far by this store.
    pub fn frames_named(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl Default for FileFrameStore {
    fn default() -> Self {
        Self::new()
    }
}

fn write_failed(path: &Path, reason: impl ToString) -> FrameStoreError {
    FrameStoreError::LocalWriteFailed {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

impl FrameStore for FileFrameStore {
    fn ensure_session_dir(&self, session_dir: &Path) -> Result<(), FrameStoreError> {
        fs::create_dir_all(session_dir).map_err(|e| {
            error!("Failed to create session dir {}: {}", session_dir.display(), e);
            write_failed(session_dir, e)
        })
    }

    fn save(&self, session_dir: &Path, frame: &[u8]) -> Result<FrameRecord, FrameStoreError> {
        self.ensure_session_dir(session_dir)?;

        let captured_at = Local::now();
        let sequence_number = self.next_sequence();
        let unique_suffix = Uuid::new_v4();
        let file_name = FrameRecord::file_name_for(&captured_at, sequence_number, &unique_suffix);
        let path = session_dir.join(format!("{}.jpg", file_name));

        if frame.is_empty() {
            error!("Refusing to write empty frame to {}", path.display());
            return Err(write_failed(&path, "frame is empty"));
        }

        // create_new: an existing file is a naming collision, never overwritten
        let mut f = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| {
                error!("Create failed {}: {}", path.display(), e);
                write_failed(&path, e)
            })?;
        f.write_all(frame)
            .and_then(|_| f.sync_all())
            .map_err(|e| {
                error!("Write failed {}: {}", path.display(), e);
                write_failed(&path, e)
            })?;
        drop(f);

        let size = match fs::metadata(&path) {
            Ok(meta) if meta.len() > 0 => meta.len(),
            Ok(_) => {
                error!("Frame file {} is empty after write", path.display());
                return Err(write_failed(&path, "file is empty after write"));
            }
            Err(e) => {
                error!("Frame file {} missing after write: {}", path.display(), e);
                return Err(write_failed(&path, e));
            }
        };

        debug!("Frame #{} written ({} bytes)", sequence_number, size);
        info!("Image saved locally: {}", path.display());
        Ok(FrameRecord {
            captured_at,
            sequence_number,
            unique_suffix,
            file_name,
            path,
            size,
        })
    }
}
