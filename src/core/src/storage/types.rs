use std::path::PathBuf;

use chrono::{DateTime, Local};
use uuid::Uuid;

/// Timestamp layout used as the leading segment of a frame file name.
pub const FRAME_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// A frame persisted by the local store.
///
/// The file name is `{timestamp}_{sequence}_{suffix}`; the on-disk file adds
/// the `.jpg` extension. Records are never mutated and the files they point
/// at are never deleted by camsync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameRecord {
    pub captured_at: DateTime<Local>,
    pub sequence_number: u64,
    pub unique_suffix: Uuid,
    pub file_name: String,
    pub path: PathBuf,
    pub size: u64,
}

impl FrameRecord {
    pub fn file_name_for(captured_at: &DateTime<Local>, sequence_number: u64, suffix: &Uuid) -> String {
        format!(
            "{}_{}_{}",
            captured_at.format(FRAME_TIMESTAMP_FORMAT),
            sequence_number,
            suffix
        )
    }
}
