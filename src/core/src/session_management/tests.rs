#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use regex::Regex;
    use tempfile::TempDir;
    use tokio::time::Instant;

    use crate::data_capture::device::scripted::ScriptedDevice;
    use crate::error_handling::types::{SessionError, SessionSourceError};
    use crate::remote::memory::MemoryRemote;
    use crate::remote::types::RemoteId;
    use crate::session_management::{
        SessionController, SessionKey, SessionSettings, SessionSource, SessionState, StopReason,
    };
    use crate::storage::FileFrameStore;

    // Session source answering with a fixed identifier or failure
    struct FixedSource(Option<&'static str>);

    #[async_trait]
    impl SessionSource for FixedSource {
        async fn fetch(&self) -> Result<SessionKey, SessionSourceError> {
            match self.0 {
                Some(id) => SessionKey::parse(id),
                None => Err(SessionSourceError::Status(500)),
            }
        }
    }

    fn settings(root: &Path, max_frames: Option<u64>) -> SessionSettings {
        SessionSettings {
            storage_root: root.to_path_buf(),
            parent_folder: RemoteId::new("ROOT"),
            interval: Duration::from_secs(10),
            max_frames,
        }
    }

    fn controller(
        root: &Path,
        max_frames: Option<u64>,
        remote: Arc<MemoryRemote>,
        device: ScriptedDevice,
    ) -> SessionController {
        SessionController::new(
            settings(root, max_frames),
            remote,
            Arc::new(FileFrameStore::new()),
            Box::new(device),
        )
    }

    fn local_frames(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test(start_paused = true)]
    async fn new_session_creates_folder_and_uploads_on_cadence() {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = TempDir::new().unwrap();
        let remote = Arc::new(MemoryRemote::new());
        let device = ScriptedDevice::new();
        let counters = device.counters.clone();
        let mut ctl = controller(dir.path(), Some(2), remote.clone(), device);

        let session = ctl.start(&FixedSource(Some("abc123"))).await.unwrap();
        assert_eq!(ctl.state(), SessionState::Capturing);
        assert_eq!(session.remote_folder.id, RemoteId::new("F1"));
        assert_eq!(session.local_dir, dir.path().join("abc123"));
        assert_eq!(remote.folders().len(), 1);

        let started = Instant::now();
        let report = ctl.capture_loop(&session).await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(report.stop_reason, StopReason::FrameLimitReached);
        assert_eq!(report.frames_captured, 2);
        assert_eq!(report.frames_uploaded, 2);
        assert!(elapsed >= Duration::from_secs(10) && elapsed < Duration::from_secs(11));

        let files = remote.files();
        let first = Regex::new(r"^\d{8}_\d{6}_1_[0-9a-f-]{36}\.jpg$").unwrap();
        let second = Regex::new(r"^\d{8}_\d{6}_2_[0-9a-f-]{36}\.jpg$").unwrap();
        assert!(first.is_match(&files[0].name), "{}", files[0].name);
        assert!(second.is_match(&files[1].name), "{}", files[1].name);
        assert!(files.iter().all(|f| f.parent == RemoteId::new("F1")));
        assert!(files.iter().all(|f| f.media_type == "image/jpeg"));
        assert_eq!(local_frames(&session.local_dir).len(), 2);

        assert_eq!(ctl.state(), SessionState::Stopped);
        assert_eq!(counters.releases(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn upload_failure_does_not_stop_capture() {
        let dir = TempDir::new().unwrap();
        let remote = Arc::new(MemoryRemote::failing_uploads(&[3]));
        let mut ctl = controller(dir.path(), Some(4), remote.clone(), ScriptedDevice::new());

        let report = ctl.run(&FixedSource(Some("abc123"))).await.unwrap();

        assert_eq!(report.frames_captured, 4);
        assert_eq!(report.frames_saved, 4);
        assert_eq!(report.frames_uploaded, 3);
        assert_eq!(report.upload_failures, 1);
        assert_eq!(remote.upload_attempts(), 4);

        // frame 3 never reached the remote but is still on disk
        let local = local_frames(&dir.path().join("abc123"));
        assert_eq!(local.len(), 4);
        let uploaded: Vec<String> = remote.files().into_iter().map(|f| f.name).collect();
        let missing: Vec<&String> = local.iter().filter(|n| !uploaded.contains(n)).collect();
        assert_eq!(missing.len(), 1);
        assert!(missing[0].contains("_3_"));
    }

    #[tokio::test(start_paused = true)]
    async fn device_failure_stops_and_releases_once() {
        let dir = TempDir::new().unwrap();
        let remote = Arc::new(MemoryRemote::new());
        let device = ScriptedDevice::failing_on_read(5);
        let counters = device.counters.clone();
        let mut ctl = controller(dir.path(), None, remote.clone(), device);

        let report = ctl.run(&FixedSource(Some("abc123"))).await.unwrap();

        assert!(matches!(report.stop_reason, StopReason::DeviceFailure(_)));
        assert_eq!(report.frames_captured, 4);
        assert_eq!(report.frames_saved, 4);
        assert_eq!(remote.upload_attempts(), 4);
        assert_eq!(counters.reads(), 5);
        assert_eq!(counters.releases(), 1);
        assert_eq!(ctl.state(), SessionState::Stopped);
        assert_eq!(local_frames(&dir.path().join("abc123")).len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_save_skips_upload_and_continues() {
        let dir = TempDir::new().unwrap();
        let remote = Arc::new(MemoryRemote::new());
        let device = ScriptedDevice::new().with_empty_reads(&[2]);
        let mut ctl = controller(dir.path(), Some(3), remote.clone(), device);

        let report = ctl.run(&FixedSource(Some("abc123"))).await.unwrap();

        assert_eq!(report.frames_captured, 3);
        assert_eq!(report.frames_saved, 2);
        assert_eq!(report.save_failures, 1);
        assert_eq!(report.frames_uploaded, 2);
        assert_eq!(remote.upload_attempts(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_is_honoured_within_one_iteration() {
        let dir = TempDir::new().unwrap();
        let device = ScriptedDevice::new();
        let counters = device.counters.clone();
        let mut ctl = controller(dir.path(), None, Arc::new(MemoryRemote::new()), device);
        let token = ctl.cancellation_token();

        let stopper = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(25)).await;
            token.cancel();
        });
        let report = ctl.run(&FixedSource(Some("abc123"))).await.unwrap();
        stopper.await.unwrap();

        assert_eq!(report.stop_reason, StopReason::Cancelled);
        assert_eq!(report.frames_captured, 3);
        assert_eq!(counters.releases(), 1);
    }

    #[tokio::test]
    async fn cancelled_before_capture_reads_nothing() {
        let dir = TempDir::new().unwrap();
        let device = ScriptedDevice::new();
        let counters = device.counters.clone();
        let mut ctl = controller(dir.path(), None, Arc::new(MemoryRemote::new()), device);
        ctl.cancellation_token().cancel();

        let report = ctl.run(&FixedSource(Some("abc123"))).await.unwrap();

        assert_eq!(report.stop_reason, StopReason::Cancelled);
        assert_eq!(counters.reads(), 0);
        assert_eq!(counters.opens(), 1);
        assert_eq!(counters.releases(), 1);
    }

    #[tokio::test]
    async fn remote_outage_aborts_startup() {
        let dir = TempDir::new().unwrap();
        let device = ScriptedDevice::new();
        let counters = device.counters.clone();
        let mut ctl = controller(dir.path(), None, Arc::new(MemoryRemote::offline()), device);

        let err = ctl.run(&FixedSource(Some("abc123"))).await.unwrap_err();

        assert!(matches!(err, SessionError::RemoteUnavailable(_)));
        assert_eq!(ctl.state(), SessionState::Idle);
        assert_eq!(counters.opens(), 0);
    }

    #[tokio::test]
    async fn session_source_failure_aborts_startup() {
        let dir = TempDir::new().unwrap();
        let remote = Arc::new(MemoryRemote::new());
        let mut ctl = controller(dir.path(), None, remote.clone(), ScriptedDevice::new());

        let err = ctl.start(&FixedSource(None)).await.unwrap_err();

        assert!(matches!(err, SessionError::SessionSourceUnavailable(_)));
        assert_eq!(ctl.state(), SessionState::Idle);
        assert_eq!(remote.lookups(), 0);
        assert!(!dir.path().join("abc123").exists());
    }

    #[tokio::test]
    async fn device_open_failure_is_fatal() {
        let dir = TempDir::new().unwrap();
        let device = ScriptedDevice::failing_open();
        let counters = device.counters.clone();
        let mut ctl = controller(dir.path(), None, Arc::new(MemoryRemote::new()), device);

        let err = ctl.run(&FixedSource(Some("abc123"))).await.unwrap_err();

        assert!(matches!(err, SessionError::DeviceFailure(_)));
        assert_eq!(ctl.state(), SessionState::Stopped);
        assert_eq!(counters.releases(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn restarted_session_reuses_remote_folder() {
        let dir = TempDir::new().unwrap();
        let remote = Arc::new(MemoryRemote::new());

        let mut first = controller(dir.path(), Some(1), remote.clone(), ScriptedDevice::new());
        first.run(&FixedSource(Some("abc123"))).await.unwrap();
        let mut second = controller(dir.path(), Some(1), remote.clone(), ScriptedDevice::new());
        second.run(&FixedSource(Some("abc123"))).await.unwrap();

        assert_eq!(remote.folders().len(), 1);
        assert_eq!(remote.files().len(), 2);
        assert!(remote.files().iter().all(|f| f.parent == RemoteId::new("F1")));
        assert_eq!(local_frames(&dir.path().join("abc123")).len(), 2);
    }

    #[tokio::test]
    async fn capture_requires_resolved_session() {
        let dir = TempDir::new().unwrap();
        let remote = Arc::new(MemoryRemote::new());
        let mut ctl = controller(dir.path(), Some(1), remote.clone(), ScriptedDevice::new());
        let session = ctl.start(&FixedSource(Some("abc123"))).await.unwrap();
        ctl.capture_loop(&session).await.unwrap();

        // Stopped is terminal
        assert!(matches!(
            ctl.capture_loop(&session).await,
            Err(SessionError::InvalidState(_))
        ));
        assert!(matches!(
            ctl.start(&FixedSource(Some("abc123"))).await,
            Err(SessionError::InvalidState(_))
        ));
    }
}
