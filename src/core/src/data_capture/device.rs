//! Capture device abstraction.
//!
//! A device is opened once per session, read one frame at a time, and
//! released exactly once. [`DeviceGuard`] enforces the last part: it owns the
//! device for the duration of the capture loop and releases it on drop if the
//! loop did not already do so, which covers early returns and panics.

use async_trait::async_trait;
use log::debug;

use crate::error_handling::types::DeviceError;

#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Acquires the device. Failure is fatal for the session.
    async fn open(&mut self) -> Result<(), DeviceError>;

    /// Grabs one encoded frame.
    async fn read_frame(&mut self) -> Result<Vec<u8>, DeviceError>;

    /// Gives the device back to the system.
    fn release(&mut self);
}

/// Exclusive, self-releasing ownership of an opened device.
pub struct DeviceGuard {
    device: Box<dyn CaptureDevice>,
    released: bool,
}

impl DeviceGuard {
    /// Opens `device` and wraps it; the device is dropped unopened on failure.
    pub async fn open(mut device: Box<dyn CaptureDevice>) -> Result<Self, DeviceError> {
        device.open().await?;
        Ok(Self {
            device,
            released: false,
        })
    }

    pub async fn read_frame(&mut self) -> Result<Vec<u8>, DeviceError> {
        self.device.read_frame().await
    }

    /// Releases the device now. Further calls are no-ops.
    pub fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.device.release();
            debug!("Capture device released");
        }
    }
}

impl Drop for DeviceGuard {
    fn drop(&mut self) {
        self.release();
    }
}
