use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{debug, error, info, warn};
use tokio_util::sync::CancellationToken;

use crate::configuration::config::Config;
use crate::data_capture::device::{CaptureDevice, DeviceGuard};
use crate::error_handling::types::SessionError;
use crate::remote::client::RemoteStorage;
use crate::remote::resolver::FolderResolver;
use crate::remote::types::{RemoteId, UploadOutcome, UploadResult};
use crate::remote::uploader::Uploader;
use crate::session_management::session::{Session, SessionKey};
use crate::session_management::session_source::SessionSource;
use crate::storage::storage_trait::FrameStore;

/// Lifecycle of a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Resolving,
    Capturing,
    Stopped,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Resolving => "resolving",
            SessionState::Capturing => "capturing",
            SessionState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Why the capture loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The cancellation token was triggered.
    Cancelled,
    /// The configured frame limit was reached.
    FrameLimitReached,
    /// The device failed to deliver a frame.
    DeviceFailure(String),
}

/// Counters gathered while capturing; returned when the loop stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub frames_captured: u64,
    pub frames_saved: u64,
    pub frames_uploaded: u64,
    pub save_failures: u64,
    pub upload_failures: u64,
    pub stop_reason: StopReason,
}

/// Fixed parameters of a capture session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub storage_root: PathBuf,
    pub parent_folder: RemoteId,
    pub interval: Duration,
    pub max_frames: Option<u64>,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            storage_root: config.storage.root.clone(),
            parent_folder: RemoteId::new(config.remote.root_folder_id.trim()),
            interval: Duration::from_secs(config.capture.interval_secs),
            max_frames: config.capture.max_frames,
        }
    }
}

#[derive(Default)]
struct Counters {
    captured: u64,
    saved: u64,
    uploaded: u64,
    save_failures: u64,
    upload_failures: u64,
}

impl Counters {
    fn into_report(self, stop_reason: StopReason) -> SessionReport {
        SessionReport {
            frames_captured: self.captured,
            frames_saved: self.saved,
            frames_uploaded: self.uploaded,
            save_failures: self.save_failures,
            upload_failures: self.upload_failures,
            stop_reason,
        }
    }
}

/// Drives one session from folder resolution to the end of capture.
///
/// The controller owns the capture device, the frame store (and with it the
/// frame counter) and the session it resolved. Work inside an iteration is
/// strictly sequential: capture, save, upload, then the fixed sleep. Only a
/// device failure ends the loop on its own; save and upload failures are
/// logged and the frame stays on disk.
pub struct SessionController {
    settings: SessionSettings,
    store: Arc<dyn FrameStore>,
    resolver: FolderResolver,
    uploader: Uploader,
    device: Option<Box<dyn CaptureDevice>>,
    cancel: CancellationToken,
    state: SessionState,
}

impl SessionController {
    pub fn new(
        settings: SessionSettings,
        remote: Arc<dyn RemoteStorage>,
        store: Arc<dyn FrameStore>,
        device: Box<dyn CaptureDevice>,
    ) -> Self {
        Self {
            settings,
            store,
            resolver: FolderResolver::new(remote.clone()),
            uploader: Uploader::new(remote),
            device: Some(device),
            cancel: CancellationToken::new(),
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Token that stops the capture loop within one iteration once cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Fetches the session identifier and resolves its folders.
    pub async fn start(&mut self, source: &dyn SessionSource) -> Result<Session, SessionError> {
        self.expect_state(SessionState::Idle)?;
        let key = source.fetch().await.map_err(|e| {
            error!("Could not fetch session identifier: {}", e);
            SessionError::SessionSourceUnavailable(e)
        })?;
        self.begin(key).await
    }

    /// Resolves local and remote folders for `key`.
    ///
    /// On failure the controller goes back to `Idle` and capture never starts.
    pub async fn begin(&mut self, key: SessionKey) -> Result<Session, SessionError> {
        self.expect_state(SessionState::Idle)?;
        self.state = SessionState::Resolving;
        info!("Starting session {}", key);

        let local_dir = key.local_dir(&self.settings.storage_root);
        if let Err(e) = self.store.ensure_session_dir(&local_dir) {
            error!("Session {} aborted: {}", key, e);
            self.state = SessionState::Idle;
            return Err(e.into());
        }

        let remote_folder = match self.resolver.resolve(&key, &self.settings.parent_folder).await {
            Ok(folder) => folder,
            Err(e) => {
                error!("Session {} aborted: {}", key, e);
                self.state = SessionState::Idle;
                return Err(e.into());
            }
        };

        info!(
            "Session {} bound to remote folder {} (local {})",
            key,
            remote_folder.id,
            local_dir.display()
        );
        self.state = SessionState::Capturing;
        Ok(Session {
            key,
            local_dir,
            remote_folder,
            started_at: Utc::now(),
        })
    }

    /// Captures frames for `session` until cancelled, the frame limit is
    /// reached or the device fails. The device is released on every path.
    ///
    /// A device that cannot be opened is an error; a device that fails
    /// mid-session ends the loop with [`StopReason::DeviceFailure`].
    pub async fn capture_loop(&mut self, session: &Session) -> Result<SessionReport, SessionError> {
        self.expect_state(SessionState::Capturing)?;
        let device = self
            .device
            .take()
            .ok_or_else(|| SessionError::InvalidState("without a capture device".into()))?;

        let mut guard = match DeviceGuard::open(device).await {
            Ok(guard) => guard,
            Err(e) => {
                error!("Session {}: {}", session.key, e);
                self.state = SessionState::Stopped;
                return Err(e.into());
            }
        };

        let mut counters = Counters::default();
        let stop_reason = loop {
            if self.cancel.is_cancelled() {
                break StopReason::Cancelled;
            }

            let frame = match guard.read_frame().await {
                Ok(frame) => frame,
                Err(e) => {
                    error!("Failed to capture image: {}", e);
                    break StopReason::DeviceFailure(e.to_string());
                }
            };
            counters.captured += 1;

            if let Some(result) = self.process_frame(session, &frame, &mut counters).await {
                if !result.is_success() {
                    debug!("Frame {} kept locally only: {:?}", result.file_name, result.outcome);
                }
            }

            if self
                .settings
                .max_frames
                .is_some_and(|max| counters.captured >= max)
            {
                break StopReason::FrameLimitReached;
            }

            tokio::select! {
                _ = self.cancel.cancelled() => break StopReason::Cancelled,
                _ = tokio::time::sleep(self.settings.interval) => {}
            }
        };

        guard.release();
        self.state = SessionState::Stopped;
        let report = counters.into_report(stop_reason);
        info!(
            "Session {} stopped ({:?}): captured={}, saved={}, uploaded={}, save_failures={}, upload_failures={}",
            session.key,
            report.stop_reason,
            report.frames_captured,
            report.frames_saved,
            report.frames_uploaded,
            report.save_failures,
            report.upload_failures
        );
        Ok(report)
    }

    /// `start` followed by `capture_loop`.
    pub async fn run(&mut self, source: &dyn SessionSource) -> Result<SessionReport, SessionError> {
        let session = self.start(source).await?;
        self.capture_loop(&session).await
    }

    /// Saves one frame and uploads it. Returns `None` when the save failed
    /// and no upload was attempted.
    async fn process_frame(
        &self,
        session: &Session,
        frame: &[u8],
        counters: &mut Counters,
    ) -> Option<UploadResult> {
        let record = match self.store.save(&session.local_dir, frame) {
            Ok(record) => record,
            Err(e) => {
                counters.save_failures += 1;
                warn!("Frame not saved, skipping upload: {}", e);
                return None;
            }
        };
        counters.saved += 1;

        let outcome = match self
            .uploader
            .upload(&record.path, &session.remote_folder.id)
            .await
        {
            Ok(remote_object_id) => {
                counters.uploaded += 1;
                UploadOutcome::Uploaded { remote_object_id }
            }
            Err(e) => {
                counters.upload_failures += 1;
                warn!(
                    "Upload of {} failed, local copy kept: {}",
                    record.path.display(),
                    e
                );
                UploadOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };

        Some(UploadResult {
            file_name: record.file_name,
            local_path: record.path,
            outcome,
        })
    }

    fn expect_state(&self, expected: SessionState) -> Result<(), SessionError> {
        if self.state != expected {
            return Err(SessionError::InvalidState(self.state.to_string()));
        }
        Ok(())
    }
}
