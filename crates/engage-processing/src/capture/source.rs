//! Capture source: wraps file-drop and camera acquisition into a single
//! in-memory media source with a preview handle.

use bytes::Bytes;
use engage_core::models::MediaSource;
use engage_core::AppError;
use thiserror::Error;

use super::camera::{CameraDevice, Facing};

const CAMERA_CAPTURE_FILENAME: &str = "camera-capture.jpg";

/// Capture errors
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Camera access denied: {0}")]
    AccessDenied(String),

    #[error("Frame capture failed: {0}")]
    CaptureFailed(String),
}

impl From<CaptureError> for AppError {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::AccessDenied(msg) => AppError::PermissionDenied(msg),
            CaptureError::CaptureFailed(msg) => {
                AppError::Internal(format!("camera capture failed: {}", msg))
            }
        }
    }
}

/// A candidate file handed over by a drop action.
#[derive(Debug, Clone)]
pub struct DroppedFile {
    pub data: Bytes,
    pub content_type: String,
    pub filename: String,
}

/// Holds the current media source for one post-creation session.
///
/// The generation counter advances whenever the source is cleared or
/// replaced; upload results captured under an older generation are orphaned
/// and must be ignored by the caller.
#[derive(Default)]
pub struct CaptureSource {
    current: Option<MediaSource>,
    generation: u64,
}

impl CaptureSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a list of dropped candidate files.
    ///
    /// Selects the first candidate, constrained to image and video MIME
    /// types. An empty list or a non-media candidate is a silent no-op.
    pub fn acquire_from_drop(&mut self, files: Vec<DroppedFile>) -> Option<&MediaSource> {
        let file = files.into_iter().next()?;
        if !file.content_type.starts_with("image/") && !file.content_type.starts_with("video/") {
            tracing::debug!(content_type = %file.content_type, "Ignoring non-media drop");
            return None;
        }

        self.replace(MediaSource::new(
            file.data,
            file.content_type,
            file.filename,
        ));
        self.current.as_ref()
    }

    /// Capture a single still frame from a rear-facing device.
    ///
    /// The camera stream is stopped on every path, success or failure,
    /// immediately after the frame attempt.
    pub async fn acquire_from_camera(
        &mut self,
        device: &dyn CameraDevice,
    ) -> Result<&MediaSource, CaptureError> {
        let mut stream = device.open(Facing::Rear).await?;
        let frame = stream.still_frame().await;
        stream.stop().await;
        let frame = frame?;

        self.replace(MediaSource::new(
            frame,
            "image/jpeg".to_string(),
            CAMERA_CAPTURE_FILENAME.to_string(),
        ));
        Ok(self.current.as_ref().expect("source set above"))
    }

    /// Release the preview handle and return to the empty state.
    pub fn clear(&mut self) {
        if let Some(mut source) = self.current.take() {
            source.preview.revoke();
            self.generation = self.generation.wrapping_add(1);
            tracing::debug!(generation = self.generation, "Capture source cleared");
        }
    }

    pub fn source(&self) -> Option<&MediaSource> {
        self.current.as_ref()
    }

    /// Generation of the current source; stale upload results carry an older
    /// value.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn replace(&mut self, source: MediaSource) {
        if let Some(mut previous) = self.current.take() {
            previous.preview.revoke();
            self.generation = self.generation.wrapping_add(1);
        }
        self.current = Some(source);
    }
}
