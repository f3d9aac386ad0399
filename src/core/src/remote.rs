//! Remote subsystem
//!
//! Everything that talks to the remote hierarchical store.
//!
//! Components:
//! - `client`: the `RemoteStorage` trait the pipeline depends on.
//! - `types`: remote handles, folders and per-frame upload results.
//! - `resolver`: find-or-create of the session folder.
//! - `uploader`: transmission of a persisted frame.
//! - `drive`: reqwest-based adapter for a Drive-v3 style REST service.

pub mod client;
pub mod drive;
pub mod resolver;
pub mod types;
pub mod uploader;

#[cfg(test)]
pub(crate) mod memory;

pub use client::RemoteStorage;
pub use resolver::FolderResolver;
pub use uploader::Uploader;
