//! Storage key generation.
//!
//! Keys are `media/{uuid}.{ext}`: a v4 UUID (128 bits of randomness, so
//! collisions are cryptographically negligible) plus the original file
//! extension.

use engage_core::constants::{DEFAULT_MEDIA_EXTENSION, MEDIA_KEY_PREFIX};
use uuid::Uuid;

/// Generate a globally-unique storage key for an object with the given file
/// extension. The extension is sanitized to lowercase alphanumerics.
pub fn generate_object_key(extension: &str) -> String {
    let ext: String = extension
        .trim_start_matches('.')
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(8)
        .collect::<String>()
        .to_lowercase();
    let ext = if ext.is_empty() {
        DEFAULT_MEDIA_EXTENSION.to_string()
    } else {
        ext
    };
    format!("{}/{}.{}", MEDIA_KEY_PREFIX, Uuid::new_v4(), ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let key = generate_object_key("jpg");
        assert!(key.starts_with("media/"));
        assert!(key.ends_with(".jpg"));
        let stem = key
            .strip_prefix("media/")
            .and_then(|rest| rest.strip_suffix(".jpg"))
            .unwrap();
        assert!(Uuid::parse_str(stem).is_ok());
    }

    #[test]
    fn test_keys_are_unique() {
        assert_ne!(generate_object_key("png"), generate_object_key("png"));
    }

    #[test]
    fn test_extension_sanitized() {
        assert!(generate_object_key(".JPG").ends_with(".jpg"));
        assert!(generate_object_key("../../etc").ends_with(".etc"));
        assert!(generate_object_key("").ends_with(".jpg"));
    }
}
