//! Device camera abstraction.
//!
//! Camera access is an exclusive hardware resource. The stream returned by
//! [`CameraDevice::open`] must be stopped as soon as the still frame has been
//! captured, on every path. [`CaptureSource::acquire_from_camera`]
//! (crate::capture::CaptureSource::acquire_from_camera) owns that guarantee;
//! device implementations only have to make `stop` idempotent.

use async_trait::async_trait;
use bytes::Bytes;

use super::source::CaptureError;

/// Which way the capture device faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Front,
    Rear,
}

/// A capture device that can be opened for exclusive access.
#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Request exclusive access to a device with the given facing.
    ///
    /// Fails with [`CaptureError::AccessDenied`] when permission is refused
    /// or no such device exists; callers surface this as recoverable.
    async fn open(&self, facing: Facing) -> Result<Box<dyn CameraStream>, CaptureError>;
}

/// An open, exclusive camera stream.
#[async_trait]
pub trait CameraStream: Send {
    /// Capture a single still frame as an encoded JPEG.
    async fn still_frame(&mut self) -> Result<Bytes, CaptureError>;

    /// Release the device. Must be idempotent.
    async fn stop(&mut self);
}
