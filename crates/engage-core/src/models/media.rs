//! Media pipeline models: capture source, crop/rotation inputs, transform
//! output, and upload progress.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_MEDIA_EXTENSION;

/// Locally-resolvable preview handle for a captured media source.
///
/// Backed by a base64 data URL so previews need no round trip to storage.
/// The handle must be revoked when the source is cleared or replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewHandle(Option<String>);

impl PreviewHandle {
    /// Encode raw media bytes into a data-URL preview.
    pub fn from_bytes(content_type: &str, data: &[u8]) -> Self {
        let url = format!("data:{};base64,{}", content_type, STANDARD.encode(data));
        PreviewHandle(Some(url))
    }

    /// The preview URL, if the handle has not been revoked.
    pub fn url(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Release the preview resource. Idempotent.
    pub fn revoke(&mut self) {
        self.0 = None;
    }

    pub fn is_revoked(&self) -> bool {
        self.0.is_none()
    }
}

/// The user's originally selected or captured media blob, pre-transform.
///
/// Immutable once created; discarded when the user clears the selection or a
/// new source replaces it.
#[derive(Debug, Clone)]
pub struct MediaSource {
    pub data: Bytes,
    pub content_type: String,
    pub original_filename: String,
    pub preview: PreviewHandle,
}

impl MediaSource {
    pub fn new(data: Bytes, content_type: String, original_filename: String) -> Self {
        let preview = PreviewHandle::from_bytes(&content_type, &data);
        MediaSource {
            data,
            content_type,
            original_filename,
            preview,
        }
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    pub fn is_video(&self) -> bool {
        self.content_type.starts_with("video/")
    }

    /// File extension from the original name, falling back to the content
    /// type's subtype, then to the default.
    pub fn extension(&self) -> String {
        extension_for(&self.original_filename, &self.content_type)
    }
}

/// Derive a file extension from a filename, falling back to the content
/// type's subtype, then to the default.
pub fn extension_for(filename: &str, content_type: &str) -> String {
    if let Some((_, ext)) = filename.rsplit_once('.') {
        if !ext.is_empty() {
            return ext.to_lowercase();
        }
    }
    match content_type.rsplit_once('/') {
        Some((_, sub)) if !sub.is_empty() => match sub {
            "jpeg" => "jpg".to_string(),
            other => other.to_lowercase(),
        },
        _ => DEFAULT_MEDIA_EXTENSION.to_string(),
    }
}

/// Rectangular sub-area of the source image to retain, in source pixel space.
///
/// Absent means "use the full frame". Bounds are validated at transform time,
/// not at input time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        CropRegion {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the region is non-degenerate and lies within the given natural
    /// image bounds.
    pub fn fits_within(&self, image_width: u32, image_height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.x.checked_add(self.width).is_some_and(|r| r <= image_width)
            && self.y.checked_add(self.height).is_some_and(|b| b <= image_height)
    }
}

/// Rotation angle, restricted to quarter turns.
///
/// Cycles forward by 90 degrees on each rotate action, wrapping modulo 360.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// The next quarter turn clockwise.
    pub fn rotated(self) -> Self {
        match self {
            Rotation::Deg0 => Rotation::Deg90,
            Rotation::Deg90 => Rotation::Deg180,
            Rotation::Deg180 => Rotation::Deg270,
            Rotation::Deg270 => Rotation::Deg0,
        }
    }

    pub fn is_zero(self) -> bool {
        self == Rotation::Deg0
    }

    /// Whether this rotation swaps width and height of a drawn image.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

impl From<Rotation> for u16 {
    fn from(r: Rotation) -> u16 {
        r.degrees()
    }
}

impl TryFrom<u16> for Rotation {
    type Error = String;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        match degrees % 360 {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            other => Err(format!(
                "rotation must be a multiple of 90 degrees, got {}",
                other
            )),
        }
    }
}

/// Final encoded media produced by the transform engine.
///
/// Derived deterministically from (source, crop, rotation) and recomputed
/// fresh on every upload attempt. Width, height, and content type always
/// reflect the final encoded bytes, not the source.
#[derive(Debug, Clone)]
pub struct TransformResult {
    pub data: Bytes,
    pub content_type: String,
    pub width: u32,
    pub height: u32,
    pub original_name: String,
}

impl TransformResult {
    /// File extension for the final bytes, from the original name with the
    /// final content type as fallback.
    pub fn extension(&self) -> String {
        extension_for(&self.original_name, &self.content_type)
    }
}

/// Byte-level progress of a single upload attempt.
///
/// Monotonically non-decreasing within one attempt; reset to zero at the
/// start of each attempt. Reaches exactly 100 percent only on confirmed
/// completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadProgress {
    pub bytes_sent: u64,
    pub bytes_total: u64,
}

impl UploadProgress {
    pub fn started(bytes_total: u64) -> Self {
        UploadProgress {
            bytes_sent: 0,
            bytes_total,
        }
    }

    /// Whole-number percentage, rounded down so 100 is reached only when
    /// every byte has been confirmed.
    pub fn percent(&self) -> u8 {
        if self.bytes_total == 0 {
            return 0;
        }
        let sent = self.bytes_sent.min(self.bytes_total);
        ((sent as u128 * 100) / self.bytes_total as u128) as u8
    }

    pub fn is_complete(&self) -> bool {
        self.bytes_total > 0 && self.bytes_sent >= self.bytes_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_handle_revoke() {
        let mut preview = PreviewHandle::from_bytes("image/png", b"fake");
        assert!(preview.url().unwrap().starts_with("data:image/png;base64,"));
        preview.revoke();
        assert!(preview.is_revoked());
        assert!(preview.url().is_none());
        // Revoking twice is fine.
        preview.revoke();
        assert!(preview.is_revoked());
    }

    #[test]
    fn test_media_source_extension() {
        let source = MediaSource::new(
            Bytes::from_static(b"x"),
            "image/jpeg".to_string(),
            "photo.JPG".to_string(),
        );
        assert_eq!(source.extension(), "jpg");

        let source = MediaSource::new(
            Bytes::from_static(b"x"),
            "image/jpeg".to_string(),
            "camera-capture".to_string(),
        );
        assert_eq!(source.extension(), "jpg");

        let source = MediaSource::new(
            Bytes::from_static(b"x"),
            "image/webp".to_string(),
            "noext".to_string(),
        );
        assert_eq!(source.extension(), "webp");
    }

    #[test]
    fn test_crop_region_bounds() {
        let crop = CropRegion::new(100, 100, 400, 300);
        assert!(crop.fits_within(1000, 800));
        assert!(crop.fits_within(500, 400));
        assert!(!crop.fits_within(499, 400));
        assert!(!crop.fits_within(500, 399));
        assert!(!CropRegion::new(0, 0, 0, 10).fits_within(100, 100));
    }

    #[test]
    fn test_rotation_cycles_back_to_zero() {
        let mut rotation = Rotation::default();
        for _ in 0..4 {
            rotation = rotation.rotated();
        }
        assert_eq!(rotation, Rotation::Deg0);
    }

    #[test]
    fn test_rotation_from_degrees() {
        assert_eq!(Rotation::try_from(90).unwrap(), Rotation::Deg90);
        assert_eq!(Rotation::try_from(450).unwrap(), Rotation::Deg90);
        assert!(Rotation::try_from(45).is_err());
    }

    #[test]
    fn test_upload_progress_percent() {
        let mut progress = UploadProgress::started(200);
        assert_eq!(progress.percent(), 0);
        progress.bytes_sent = 199;
        assert_eq!(progress.percent(), 99);
        assert!(!progress.is_complete());
        progress.bytes_sent = 200;
        assert_eq!(progress.percent(), 100);
        assert!(progress.is_complete());
    }

    #[test]
    fn test_upload_progress_zero_total() {
        let progress = UploadProgress::started(0);
        assert_eq!(progress.percent(), 0);
        assert!(!progress.is_complete());
    }
}
