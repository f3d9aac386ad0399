//! Frame Store Trait
//!
//! This module defines the `FrameStore` trait, the local persistence seam of
//! the capture pipeline.
//!
//! Implementors of this trait are responsible for:
//! - Creating the session directory on first use
//! - Naming every frame uniquely, even across rapid calls and restarts
//! - Verifying the written file before reporting success

use std::path::Path;

use crate::error_handling::types::FrameStoreError;
use crate::storage::types::FrameRecord;

pub trait FrameStore: Send + Sync {
    /// Persists `frame` under `session_dir` and returns its record.
    ///
    /// A missing or zero-size file after the write is a `LocalWriteFailed`.
    fn save(&self, session_dir: &Path, frame: &[u8]) -> Result<FrameRecord, FrameStoreError>;

    /// Creates `session_dir` (and parents) if absent.
    fn ensure_session_dir(&self, session_dir: &Path) -> Result<(), FrameStoreError>;
}
