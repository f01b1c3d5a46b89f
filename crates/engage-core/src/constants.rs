//! Shared constants.

/// Provisional platform value written when a post record is created at upload
/// time, before the user picks a real target platform in the wizard.
pub const PLACEHOLDER_PLATFORM: &str = "default";

/// Prefix under which all uploaded media objects are stored.
pub const MEDIA_KEY_PREFIX: &str = "media";

/// Number of captions the generation collaborator must return.
pub const CAPTION_COUNT: usize = 3;

/// Fallback extension when the original filename carries none.
pub const DEFAULT_MEDIA_EXTENSION: &str = "jpg";
