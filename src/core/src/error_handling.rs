//! Error types shared by every camsync component.

pub mod types;
