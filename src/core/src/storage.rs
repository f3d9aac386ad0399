//! Storage subsystem
//!
//! Local persistence for captured frames. The local copy is the durability
//! record of a session: frames are written here before any upload and are
//! kept whether or not the upload succeeds.
//!
//! Components:
//! - `storage_trait`: the `FrameStore` trait used by the session controller.
//! - `types`: the `FrameRecord` describing a persisted frame.
//! - `file_storage`: filesystem-backed implementation.

pub mod file_storage;
pub mod storage_trait;
pub mod types;

pub use file_storage::FileFrameStore;
pub use storage_trait::FrameStore;
pub use types::FrameRecord;
