//! Session management core module.
//!
//! A session is the unit of capture activity: one externally supplied
//! identifier, one local directory, one remote folder.

/// Session identifier type and the resolved session value.
pub mod session;
/// Controller driving resolution and the capture loop.
pub mod session_controller;
/// External supplier of session identifiers.
pub mod session_source;

#[cfg(test)]
mod tests;

pub use session::{Session, SessionKey};
pub use session_controller::{SessionController, SessionReport, SessionSettings, SessionState, StopReason};
pub use session_source::{HttpSessionSource, SessionSource};
