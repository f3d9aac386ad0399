use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, trace, warn};
use tokio::process::Command;

use crate::configuration::types::CaptureConfig;
use crate::data_capture::device::CaptureDevice;
use crate::error_handling::types::DeviceError;

/// Placeholder in grabber arguments replaced by the device node path.
pub const DEVICE_PLACEHOLDER: &str = "{device}";

/// Camera driven through an external still-grabber program.
///
/// Each read spawns the configured program (by default `fswebcam`) which
/// must write exactly one encoded frame to stdout. Opening only checks that
/// the device node exists; the grabber holds the node for the duration of a
/// single read.
pub struct CommandCamera {
    index: u32,
    device_path: PathBuf,
    program: String,
    args: Vec<String>,
    read_timeout: Duration,
    opened: bool,
}

impl CommandCamera {
    pub fn new(config: &CaptureConfig) -> Self {
        let device_path = config
            .device_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("/dev/video{}", config.device_index)));
        Self {
            index: config.device_index,
            device_path,
            program: config.grabber_program.clone(),
            args: config.grabber_args.clone(),
            read_timeout: Duration::from_secs(config.read_timeout_secs),
            opened: false,
        }
    }

    fn expanded_args(&self) -> Vec<String> {
        let device = self.device_path.display().to_string();
        self.args
            .iter()
            .map(|arg| arg.replace(DEVICE_PLACEHOLDER, &device))
            .collect()
    }
}

#[async_trait]
impl CaptureDevice for CommandCamera {
    async fn open(&mut self) -> Result<(), DeviceError> {
        if !self.device_path.exists() {
            return Err(DeviceError::OpenFailed {
                index: self.index,
                reason: format!("{} does not exist", self.device_path.display()),
            });
        }
        self.opened = true;
        info!(
            "Opened capture device {} ({}) using '{}'",
            self.index,
            self.device_path.display(),
            self.program
        );
        Ok(())
    }

    async fn read_frame(&mut self) -> Result<Vec<u8>, DeviceError> {
        if !self.opened {
            return Err(DeviceError::NotOpen);
        }
        let args = self.expanded_args();
        debug!("Running grabber: {} {:?}", self.program, args);

        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DeviceError::ReadFailed(format!("failed to spawn {}: {}", self.program, e)))?;

        let output = tokio::time::timeout(self.read_timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                DeviceError::ReadFailed(format!(
                    "{} did not produce a frame within {:?}",
                    self.program, self.read_timeout
                ))
            })?
            .map_err(|e| DeviceError::ReadFailed(format!("{} failed: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("Grabber exited with {}: {}", output.status, stderr.trim());
            return Err(DeviceError::ReadFailed(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }
        if output.stdout.is_empty() {
            return Err(DeviceError::ReadFailed(format!(
                "{} produced no frame data",
                self.program
            )));
        }
        trace!("Grabbed {} byte(s)", output.stdout.len());
        Ok(output.stdout)
    }

    fn release(&mut self) {
        if self.opened {
            self.opened = false;
            info!("Released capture device {}", self.index);
        }
    }
}
