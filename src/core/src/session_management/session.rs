use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error_handling::types::SessionSourceError;
use crate::remote::types::RemoteFolder;

fn key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]{0,254}$").expect("session key pattern is valid")
    })
}

/// Identifier shared by a session's local directory and its remote folder.
///
/// Construction validates that the identifier is a single, safe path segment,
/// so joining it onto the storage root can never escape that root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionKey(String);

impl SessionKey {
    pub fn parse(raw: &str) -> Result<Self, SessionSourceError> {
        let trimmed = raw.trim();
        if !key_pattern().is_match(trimmed) || trimmed.contains("..") {
            return Err(SessionSourceError::InvalidIdentifier(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Local directory holding this session's frames.
    pub fn local_dir(&self, storage_root: &Path) -> PathBuf {
        storage_root.join(&self.0)
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SessionKey {
    type Error = SessionSourceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SessionKey::parse(&value)
    }
}

impl From<SessionKey> for String {
    fn from(key: SessionKey) -> Self {
        key.0
    }
}

/// A resolved capture session: where frames land locally and remotely.
#[derive(Debug, Clone)]
pub struct Session {
    pub key: SessionKey,
    pub local_dir: PathBuf,
    pub remote_folder: RemoteFolder,
    pub started_at: DateTime<Utc>,
}
