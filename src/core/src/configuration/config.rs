use super::types::*;
use crate::error_handling::types::ConfigError;
use clap::Parser;
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Command-line arguments.
///
/// Only the configuration file is required; the remaining flags override the
/// matching values of the file so a single deployment file can be reused for
/// quick manual runs.
#[derive(Parser, Debug, Clone)]
#[command(name = "camsync")]
#[command(version)]
#[command(about = "Periodic camera capture synchronised to session folders on remote storage")]
pub struct CliArgs {
    /// Path to the TOML configuration file
    ///
    /// # Command Line
    /// Positional, or set `CAMSYNC_CONFIG` in the environment
    #[arg(env = "CAMSYNC_CONFIG")]
    pub config_file: PathBuf,

    /// Capture device index, overrides `capture.device_index`
    #[arg(long)]
    pub device_index: Option<u32>,

    /// Seconds between two captures, overrides `capture.interval_secs`
    #[arg(long)]
    pub interval_secs: Option<u64>,

    /// Stop after this many frames, overrides `capture.max_frames`
    #[arg(long)]
    pub max_frames: Option<u64>,

    /// Local directory holding session folders, overrides `storage.root`
    #[arg(long)]
    pub storage_root: Option<PathBuf>,

    /// Create a top-level remote folder with this name, print its id and exit
    #[arg(long, value_name = "NAME")]
    pub create_root: Option<String>,
}

/// Application configuration loaded from a TOML file.
///
/// # Fields Overview
///
/// - `capture`: device selection, grabber command and cadence
/// - `storage`: root directory for the local session folders
/// - `remote`: parent folder id, API endpoint and credential file
/// - `session_source`: endpoint that supplies the session identifier
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub session_source: SessionSourceConfig,
}

impl Config {
    /// Reads and validates the configuration file at `path`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&raw)?;
        debug!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(raw).map_err(|e| ConfigError::TomlError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the file named by `args` and applies its overrides.
    pub fn from_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(&args.config_file)?;
        config.apply_overrides(args);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, args: &CliArgs) {
        if let Some(index) = args.device_index {
            self.capture.device_index = index;
        }
        if let Some(secs) = args.interval_secs {
            self.capture.interval_secs = secs;
        }
        if let Some(max) = args.max_frames {
            self.capture.max_frames = Some(max);
        }
        if let Some(ref root) = args.storage_root {
            self.storage.root = root.clone();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.remote.root_folder_id.trim().is_empty() {
            return Err(ConfigError::MissingValue("remote.root_folder_id".into()));
        }
        if self.session_source.url.trim().is_empty() {
            return Err(ConfigError::MissingValue("session_source.url".into()));
        }
        if self.session_source.field.trim().is_empty() {
            return Err(ConfigError::MissingValue("session_source.field".into()));
        }
        if self.capture.grabber_program.trim().is_empty() {
            return Err(ConfigError::MissingValue("capture.grabber_program".into()));
        }
        if self.capture.interval_secs == 0 {
            return Err(ConfigError::NotInRange(
                "capture.interval_secs must be at least 1".into(),
            ));
        }
        if self.capture.max_frames == Some(0) {
            return Err(ConfigError::NotInRange(
                "capture.max_frames must be at least 1 when set".into(),
            ));
        }
        if self.capture.read_timeout_secs == 0 || self.remote.timeout_secs == 0 {
            return Err(ConfigError::NotInRange("timeouts must be at least 1 second".into()));
        }
        Ok(())
    }
}
