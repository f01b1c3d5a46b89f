//! Async wizard session.
//!
//! One [`WizardSession`] drives one post-creation flow end to end: it owns
//! the capture source, the crop and rotation inputs, and the state machine,
//! and it runs the transform-and-upload pipeline when the machine asks for
//! it. Uploads run on a spawned task so the caller gets an immediate answer
//! and can observe progress; the resolution is applied back under the
//! session lock and checked against the source generation recorded at start,
//! so clearing or replacing the media while an upload is in flight orphans
//! that attempt instead of corrupting the state.

use engage_core::models::{CropRegion, Rotation, UploadProgress};
use engage_core::AppError;
use engage_db::PostStore;
use engage_processing::capture::{CameraDevice, CaptureSource, DroppedFile};
use engage_processing::transform::TransformEngine;
use engage_processing::upload::UploadCoordinator;
use engage_storage::{watch_progress, ProgressTracker};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{watch, Mutex, Notify};
use uuid::Uuid;

use crate::machine::{NextAction, Selection, Selections, WizardMachine, WizardStep};

/// Outcome of a `next` call, for the caller to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NextOutcome {
    /// The step advanced immediately.
    Advanced(WizardStep),
    /// An upload was started; the step advances when it resolves.
    UploadStarted,
    /// An upload is already in flight; nothing new was started.
    UploadPending,
}

/// A point-in-time snapshot of the session, safe to hand to clients.
#[derive(Debug, Clone, Serialize)]
pub struct WizardStateView {
    pub step: WizardStep,
    pub selections: Selections,
    pub post_id: Option<Uuid>,
    pub has_media: bool,
    pub preview_url: Option<String>,
    pub rotation_degrees: u16,
    pub crop: Option<CropRegion>,
    pub upload_pending: bool,
    pub upload_percent: Option<u8>,
    pub last_upload_error: Option<String>,
}

struct SessionInner {
    machine: WizardMachine,
    capture: CaptureSource,
    crop: Option<CropRegion>,
    rotation: Rotation,
    progress: Option<watch::Receiver<UploadProgress>>,
    last_upload_error: Option<String>,
}

/// Drives one post-creation flow against storage and the post store.
#[derive(Clone)]
pub struct WizardSession {
    inner: Arc<Mutex<SessionInner>>,
    coordinator: UploadCoordinator,
    posts: Arc<dyn PostStore>,
    owner_id: Uuid,
    changed: Arc<Notify>,
}

impl WizardSession {
    pub fn new(
        coordinator: UploadCoordinator,
        posts: Arc<dyn PostStore>,
        owner_id: Uuid,
    ) -> Self {
        WizardSession {
            inner: Arc::new(Mutex::new(SessionInner {
                machine: WizardMachine::new(),
                capture: CaptureSource::new(),
                crop: None,
                rotation: Rotation::default(),
                progress: None,
                last_upload_error: None,
            })),
            coordinator,
            posts,
            owner_id,
            changed: Arc::new(Notify::new()),
        }
    }

    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    /// Accept dropped files as the media source. Returns whether a source
    /// was actually taken; replacing a previous source orphans any upload it
    /// had in flight.
    pub async fn drop_files(&self, files: Vec<DroppedFile>) -> bool {
        let mut inner = self.inner.lock().await;
        let accepted = inner.capture.acquire_from_drop(files).is_some();
        if accepted {
            inner.machine.media_reset();
            inner.crop = None;
            inner.rotation = Rotation::default();
            inner.progress = None;
            inner.last_upload_error = None;
        }
        accepted
    }

    /// Capture a still frame from the camera as the media source.
    pub async fn capture_from_camera(
        &self,
        device: &dyn CameraDevice,
    ) -> Result<(), AppError> {
        let mut inner = self.inner.lock().await;
        inner.capture.acquire_from_camera(device).await?;
        inner.machine.media_reset();
        inner.crop = None;
        inner.rotation = Rotation::default();
        inner.progress = None;
        inner.last_upload_error = None;
        Ok(())
    }

    /// Discard the current media source. An in-flight upload is orphaned and
    /// its eventual resolution ignored.
    pub async fn clear_media(&self) {
        let mut inner = self.inner.lock().await;
        inner.capture.clear();
        inner.machine.media_reset();
        inner.crop = None;
        inner.rotation = Rotation::default();
        inner.progress = None;
        self.changed.notify_waiters();
    }

    /// Advance the rotation by a quarter turn and return the new value.
    pub async fn rotate(&self) -> Rotation {
        let mut inner = self.inner.lock().await;
        inner.rotation = inner.rotation.rotated();
        inner.rotation
    }

    pub async fn set_crop(&self, crop: Option<CropRegion>) {
        self.inner.lock().await.crop = crop;
    }

    pub async fn select(&self, selection: Selection) -> Result<(), AppError> {
        self.inner.lock().await.machine.select(selection)
    }

    pub async fn back(&self) -> Result<WizardStep, AppError> {
        self.inner.lock().await.machine.back()
    }

    /// Ask to advance one step. On the media step this starts the upload
    /// pipeline in the background; repeat calls while it runs are no-ops.
    pub async fn next(&self) -> Result<NextOutcome, AppError> {
        let mut inner = self.inner.lock().await;
        match inner.machine.request_next()? {
            NextAction::Advanced(step) => Ok(NextOutcome::Advanced(step)),
            NextAction::UploadPending => Ok(NextOutcome::UploadPending),
            NextAction::StartUpload => {
                let source = inner
                    .capture
                    .source()
                    .cloned()
                    .ok_or_else(|| {
                        AppError::Validation("no media selected".to_string())
                    })?;
                let generation = inner.capture.generation();
                let crop = inner.crop;
                let rotation = inner.rotation;

                let (sink, receiver) = watch_progress();
                inner.progress = Some(receiver);
                inner.last_upload_error = None;
                inner.machine.upload_started(generation);
                drop(inner);

                let session = self.clone();
                tokio::spawn(async move {
                    session
                        .run_upload(source, crop, rotation, generation, sink)
                        .await;
                });
                Ok(NextOutcome::UploadStarted)
            }
        }
    }

    /// Finish the wizard: persist the selected attributes onto the uploaded
    /// post. A failed write leaves the session on the final step so the
    /// caller can retry.
    pub async fn complete(&self) -> Result<Uuid, AppError> {
        let mut inner = self.inner.lock().await;
        let (post_id, attributes) = inner.machine.request_complete()?;
        self.posts.update_attributes(post_id, &attributes).await?;
        inner.machine.completion_succeeded();
        tracing::info!(
            post_id = %post_id,
            platform = %attributes.platform,
            "Wizard complete"
        );
        Ok(post_id)
    }

    pub async fn state(&self) -> WizardStateView {
        let inner = self.inner.lock().await;
        WizardStateView {
            step: inner.machine.step(),
            selections: inner.machine.selections().clone(),
            post_id: inner.machine.post_id(),
            has_media: inner.capture.source().is_some(),
            preview_url: inner
                .capture
                .source()
                .and_then(|s| s.preview.url().map(str::to_string)),
            rotation_degrees: inner.rotation.degrees(),
            crop: inner.crop,
            upload_pending: inner.machine.pending_upload().is_some(),
            upload_percent: inner.progress.as_ref().map(|rx| rx.borrow().percent()),
            last_upload_error: inner.last_upload_error.clone(),
        }
    }

    /// Wait until no upload attempt is in flight.
    pub async fn upload_settled(&self) {
        loop {
            let notified = self.changed.notified();
            if self.inner.lock().await.machine.pending_upload().is_none() {
                return;
            }
            notified.await;
        }
    }

    async fn run_upload(
        &self,
        source: engage_core::models::MediaSource,
        crop: Option<CropRegion>,
        rotation: Rotation,
        generation: u64,
        sink: Arc<engage_storage::WatchProgress>,
    ) {
        // The transform is recomputed fresh for every attempt.
        let outcome = match TransformEngine::transform(&source, crop, rotation) {
            Ok(result) => {
                let tracker = ProgressTracker::new(result.data.len() as u64, sink);
                self.coordinator
                    .upload(&result, self.owner_id, Some(&tracker))
                    .await
            }
            Err(e) => Err(AppError::from(e)),
        };

        let mut inner = self.inner.lock().await;
        if inner.capture.generation() != generation {
            tracing::debug!(generation, "Ignoring upload result for replaced media");
            inner.machine.upload_settled_without_post(generation);
            self.changed.notify_waiters();
            return;
        }
        match outcome {
            Ok(record) => {
                inner.machine.resolve_upload(generation, record.id);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Upload attempt failed");
                inner.last_upload_error = Some(e.to_string());
                inner.machine.upload_settled_without_post(generation);
            }
        }
        self.changed.notify_waiters();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use engage_db::MemoryPostStore;
    use engage_storage::{LocalStorage, ObjectStorage, StorageError, StorageResult};
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    fn jpeg_file(width: u32, height: u32) -> DroppedFile {
        let img = RgbImage::from_pixel(width, height, Rgb([50, 90, 160]));
        let mut buffer = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
            .unwrap();
        DroppedFile {
            data: Bytes::from(buffer),
            content_type: "image/jpeg".to_string(),
            filename: "photo.jpg".to_string(),
        }
    }

    struct GatedStorage {
        release: Arc<Notify>,
        puts: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ObjectStorage for GatedStorage {
        async fn put(
            &self,
            key: &str,
            _data: Bytes,
            _content_type: &str,
            progress: Option<&ProgressTracker>,
        ) -> StorageResult<String> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
            if let Some(tracker) = progress {
                tracker.confirm_complete();
            }
            Ok(format!("http://test/{}", key))
        }

        async fn get(&self, key: &str) -> StorageResult<Bytes> {
            Err(StorageError::NotFound(key.to_string()))
        }

        async fn exists(&self, _key: &str) -> StorageResult<bool> {
            Ok(true)
        }

        async fn delete(&self, _key: &str) -> StorageResult<()> {
            Ok(())
        }

        fn public_url(&self, key: &str) -> String {
            format!("http://test/{}", key)
        }
    }

    struct FailingStorage;

    #[async_trait]
    impl ObjectStorage for FailingStorage {
        async fn put(
            &self,
            _key: &str,
            _data: Bytes,
            _content_type: &str,
            _progress: Option<&ProgressTracker>,
        ) -> StorageResult<String> {
            Err(StorageError::UploadFailed("network down".to_string()))
        }

        async fn get(&self, key: &str) -> StorageResult<Bytes> {
            Err(StorageError::NotFound(key.to_string()))
        }

        async fn exists(&self, _key: &str) -> StorageResult<bool> {
            Ok(false)
        }

        async fn delete(&self, _key: &str) -> StorageResult<()> {
            Ok(())
        }

        fn public_url(&self, key: &str) -> String {
            format!("http://test/{}", key)
        }
    }

    async fn local_session() -> (WizardSession, Arc<MemoryPostStore>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let storage = Arc::new(
            LocalStorage::new(dir.path(), "http://localhost:3000/media".to_string())
                .await
                .unwrap(),
        );
        let posts = Arc::new(MemoryPostStore::new());
        let coordinator = UploadCoordinator::new(storage, posts.clone());
        let session = WizardSession::new(coordinator, posts.clone(), Uuid::new_v4());
        (session, posts, dir)
    }

    #[tokio::test]
    async fn test_next_without_media_is_rejected() {
        let (session, _posts, _dir) = local_session().await;
        let err = session.next().await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_rapid_next_starts_exactly_one_upload() {
        let release = Arc::new(Notify::new());
        let puts = Arc::new(AtomicUsize::new(0));
        let storage = Arc::new(GatedStorage {
            release: release.clone(),
            puts: puts.clone(),
        });
        let posts = Arc::new(MemoryPostStore::new());
        let coordinator = UploadCoordinator::new(storage, posts.clone());
        let session = WizardSession::new(coordinator, posts.clone(), Uuid::new_v4());

        assert!(session.drop_files(vec![jpeg_file(64, 48)]).await);
        assert_eq!(session.next().await.unwrap(), NextOutcome::UploadStarted);
        assert_eq!(session.next().await.unwrap(), NextOutcome::UploadPending);
        assert_eq!(session.next().await.unwrap(), NextOutcome::UploadPending);

        release.notify_one();
        session.upload_settled().await;

        assert_eq!(puts.load(Ordering::SeqCst), 1);
        assert_eq!(posts.len(), 1);
        let state = session.state().await;
        assert_eq!(state.step, WizardStep::Platform);
        assert!(state.post_id.is_some());
    }

    #[tokio::test]
    async fn test_clearing_media_orphans_inflight_upload() {
        let release = Arc::new(Notify::new());
        let storage = Arc::new(GatedStorage {
            release: release.clone(),
            puts: Arc::new(AtomicUsize::new(0)),
        });
        let posts = Arc::new(MemoryPostStore::new());
        let coordinator = UploadCoordinator::new(storage, posts.clone());
        let session = WizardSession::new(coordinator, posts, Uuid::new_v4());

        session.drop_files(vec![jpeg_file(64, 48)]).await;
        session.next().await.unwrap();
        session.clear_media().await;

        release.notify_one();
        session.upload_settled().await;

        let state = session.state().await;
        assert_eq!(state.step, WizardStep::Media);
        assert!(state.post_id.is_none());
        assert!(!state.has_media);
    }

    #[tokio::test]
    async fn test_replacing_media_discards_previous_upload_progress() {
        let (session, _posts, _dir) = local_session().await;

        session.drop_files(vec![jpeg_file(64, 48)]).await;
        session.next().await.unwrap();
        session.upload_settled().await;
        assert_eq!(session.state().await.upload_percent, Some(100));

        session.drop_files(vec![jpeg_file(32, 32)]).await;
        let state = session.state().await;
        assert_eq!(state.step, WizardStep::Media);
        assert!(state.upload_percent.is_none());
        assert!(!state.upload_pending);
    }

    #[tokio::test]
    async fn test_failed_upload_reports_error_and_allows_retry() {
        let posts = Arc::new(MemoryPostStore::new());
        let coordinator = UploadCoordinator::new(Arc::new(FailingStorage), posts.clone());
        let session = WizardSession::new(coordinator, posts.clone(), Uuid::new_v4());

        session.drop_files(vec![jpeg_file(64, 48)]).await;
        session.next().await.unwrap();
        session.upload_settled().await;

        let state = session.state().await;
        assert_eq!(state.step, WizardStep::Media);
        assert!(state.last_upload_error.is_some());
        assert!(posts.is_empty());

        // The failure is not sticky; the next attempt starts fresh.
        assert_eq!(session.next().await.unwrap(), NextOutcome::UploadStarted);
        session.upload_settled().await;
    }

    #[tokio::test]
    async fn test_completion_failure_is_retryable() {
        use engage_core::models::{Goal, Platform, Tone};

        let (session, posts, _dir) = local_session().await;
        session.drop_files(vec![jpeg_file(64, 48)]).await;
        session.next().await.unwrap();
        session.upload_settled().await;

        session
            .select(Selection::Platform(Platform::Instagram))
            .await
            .unwrap();
        session.next().await.unwrap();
        session
            .select(Selection::Niche("Fitness".to_string()))
            .await
            .unwrap();
        session.next().await.unwrap();
        session.select(Selection::Goal(Goal::Sales)).await.unwrap();
        session.next().await.unwrap();
        session.select(Selection::Tone(Tone::Casual)).await.unwrap();

        posts.fail_next_update();
        assert!(session.complete().await.is_err());
        assert_eq!(session.state().await.step, WizardStep::Tone);

        let post_id = session.complete().await.unwrap();
        assert_eq!(session.state().await.step, WizardStep::Complete);
        assert_eq!(posts.update_calls(), 2);

        let record = posts.get(post_id).await.unwrap().unwrap();
        assert_eq!(record.platform, "Instagram");
        assert_eq!(record.niche.as_deref(), Some("Fitness"));
        assert_eq!(record.goal.as_deref(), Some("Sales"));
        assert_eq!(record.tone.as_deref(), Some("Casual"));
    }

    #[tokio::test]
    async fn test_rotation_cycles_and_resets_with_new_media() {
        let (session, _posts, _dir) = local_session().await;
        session.drop_files(vec![jpeg_file(64, 48)]).await;
        assert_eq!(session.rotate().await.degrees(), 90);
        assert_eq!(session.rotate().await.degrees(), 180);
        assert_eq!(session.rotate().await.degrees(), 270);
        assert_eq!(session.rotate().await.degrees(), 0);

        session.rotate().await;
        session.drop_files(vec![jpeg_file(32, 32)]).await;
        assert_eq!(session.state().await.rotation_degrees, 0);
    }
}
