//! Domain models for the post-creation pipeline.

pub mod media;
pub mod post;

pub use media::{CropRegion, MediaSource, PreviewHandle, Rotation, TransformResult, UploadProgress};
pub use post::{Goal, NewPost, Platform, PostAttributes, PostRecord, Tone};
