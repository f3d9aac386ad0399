use std::path::PathBuf;

use serde::Deserialize;

use crate::remote::drive::DEFAULT_API_BASE;

fn default_interval_secs() -> u64 {
    10
}

fn default_grabber_program() -> String {
    "fswebcam".to_string()
}

fn default_grabber_args() -> Vec<String> {
    ["-q", "-d", "{device}", "--no-banner", "-r", "1280x720", "--jpeg", "85", "-"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_read_timeout_secs() -> u64 {
    15
}

fn default_storage_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from("token.json")
}

fn default_remote_timeout_secs() -> u64 {
    30
}

fn default_session_field() -> String {
    "uuid".to_string()
}

fn default_session_timeout_secs() -> u64 {
    10
}

/// `[capture]` section: which device to read and how often.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaptureConfig {
    #[serde(default)]
    pub device_index: u32,
    /// Overrides the `/dev/video{device_index}` node.
    #[serde(default)]
    pub device_path: Option<PathBuf>,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Stop after this many device reads; unbounded when absent.
    #[serde(default)]
    pub max_frames: Option<u64>,
    #[serde(default = "default_grabber_program")]
    pub grabber_program: String,
    #[serde(default = "default_grabber_args")]
    pub grabber_args: Vec<String>,
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            device_path: None,
            interval_secs: default_interval_secs(),
            max_frames: None,
            grabber_program: default_grabber_program(),
            grabber_args: default_grabber_args(),
            read_timeout_secs: default_read_timeout_secs(),
        }
    }
}

/// `[storage]` section: where session directories are created.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
        }
    }
}

/// `[remote]` section: the parent folder sessions are created under.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteConfig {
    #[serde(default)]
    pub root_folder_id: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,
    #[serde(default = "default_remote_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            root_folder_id: String::new(),
            api_base: default_api_base(),
            credentials_path: default_credentials_path(),
            timeout_secs: default_remote_timeout_secs(),
        }
    }
}

/// `[session_source]` section: the control endpoint handing out session ids.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionSourceConfig {
    #[serde(default)]
    pub url: String,
    /// JSON field holding the session identifier.
    #[serde(default = "default_session_field")]
    pub field: String,
    #[serde(default = "default_session_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SessionSourceConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            field: default_session_field(),
            timeout_secs: default_session_timeout_secs(),
        }
    }
}
