//! Media capture: file drop and device camera.

pub mod camera;
pub mod source;

pub use camera::{CameraDevice, CameraStream, Facing};
pub use source::{CaptureError, CaptureSource, DroppedFile};
