use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};

use crate::configuration::config::Config;
use crate::data_capture::command_camera::CommandCamera;
use crate::data_capture::device::CaptureDevice;
use crate::error_handling::types::{ConfigError, ControllerError};
use crate::remote::client::RemoteStorage;
use crate::remote::drive::DriveClient;
use crate::remote::types::RemoteId;
use crate::session_management::session_controller::{SessionController, SessionReport, SessionSettings};
use crate::session_management::session_source::{HttpSessionSource, SessionSource};
use crate::storage::file_storage::FileFrameStore;

/// Wires the configured collaborators together and runs one session.
pub struct Controller {
    pub config: Config,
    remote: Arc<dyn RemoteStorage>,
    source: Box<dyn SessionSource>,
    device: Option<Box<dyn CaptureDevice>>,
}

impl Controller {
    /// Builds the production collaborators from `config`.
    ///
    /// Fails when the remote credentials cannot be loaded or an HTTP client
    /// cannot be built; nothing touches the camera or the network yet.
    pub fn new(config: Config) -> Result<Self, ControllerError> {
        info!("Creating controller");
        let remote = DriveClient::from_token_file(
            &config.remote.api_base,
            &config.remote.credentials_path,
            Duration::from_secs(config.remote.timeout_secs),
        )?;
        let source = HttpSessionSource::new(&config.session_source)
            .map_err(|e| ControllerError::InitializationFailed(e.to_string()))?;
        let device = CommandCamera::new(&config.capture);
        Ok(Self::with_parts(
            config,
            Arc::new(remote),
            Box::new(source),
            Box::new(device),
        ))
    }

    /// Assembles a controller from already built collaborators.
    pub fn with_parts(
        config: Config,
        remote: Arc<dyn RemoteStorage>,
        source: Box<dyn SessionSource>,
        device: Box<dyn CaptureDevice>,
    ) -> Self {
        Self {
            config,
            remote,
            source,
            device: Some(device),
        }
    }

    /// Runs a full session: fetch id, resolve folders, capture until stopped.
    ///
    /// Ctrl-C cancels the capture loop; the current iteration finishes first.
    pub async fn run(&mut self) -> Result<SessionReport, ControllerError> {
        let device = self
            .device
            .take()
            .ok_or_else(|| ControllerError::InitializationFailed("controller already ran".into()))?;
        let mut session_controller = SessionController::new(
            SessionSettings::from_config(&self.config),
            self.remote.clone(),
            Arc::new(FileFrameStore::new()),
            device,
        );

        let token = session_controller.cancellation_token();
        let stop_watcher = tokio::spawn(async move {
            tokio::select! {
                res = tokio::signal::ctrl_c() => {
                    match res {
                        Ok(()) => info!("Stop requested, finishing current frame"),
                        Err(e) => warn!("Unable to listen for Ctrl-C: {}", e),
                    }
                    token.cancel();
                }
                _ = token.cancelled() => {}
            }
        });

        let result = session_controller.run(self.source.as_ref()).await;
        session_controller.cancellation_token().cancel();
        let _ = stop_watcher.await;

        result.map_err(|e| {
            error!("Session failed: {}", e);
            ControllerError::SessionError(e)
        })
    }

    /// Creates a folder at the remote's top level and returns its id.
    pub async fn create_root_folder(&self, name: &str) -> Result<RemoteId, ControllerError> {
        if name.trim().is_empty() {
            return Err(ConfigError::MissingValue("root folder name".into()).into());
        }
        let id = self.remote.create_folder(name.trim(), None).await?;
        info!("Folder \"{}\" created with ID: {}", name.trim(), id);
        Ok(id)
    }
}
