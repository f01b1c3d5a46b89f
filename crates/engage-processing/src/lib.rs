//! Media capture, transformation, and upload coordination.
//!
//! The three stages of the pipeline live here:
//! - [`capture`]: file-drop and device-camera acquisition into a
//!   [`MediaSource`](engage_core::models::MediaSource);
//! - [`transform`]: crop, rotate, and re-encode into a
//!   [`TransformResult`](engage_core::models::TransformResult);
//! - [`upload`]: stream the final bytes to object storage with progress and
//!   register the post record.

pub mod capture;
pub mod transform;
pub mod upload;

pub use capture::{CameraDevice, CameraStream, CaptureError, CaptureSource, DroppedFile, Facing};
pub use transform::{TransformEngine, TransformError};
pub use upload::UploadCoordinator;
