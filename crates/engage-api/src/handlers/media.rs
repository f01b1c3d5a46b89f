//! Stored-media retrieval.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use engage_core::AppError;
use engage_storage::StorageError;

use crate::error::HttpAppError;
use crate::state::AppState;

/// Serve a stored object by its storage key.
#[tracing::instrument(skip(state), fields(key = %key))]
pub async fn serve_media(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, HttpAppError> {
    let data = state.storage.get(&key).await.map_err(|e| match e {
        StorageError::NotFound(key) => AppError::NotFound(format!("media {} not found", key)),
        StorageError::InvalidKey(_) => AppError::InvalidInput("invalid media key".to_string()),
        other => AppError::from(other),
    })?;

    let content_type = content_type_for_key(&key);
    Ok(([(header::CONTENT_TYPE, content_type)], data).into_response())
}

/// Map a storage key's extension to a content type for serving.
fn content_type_for_key(key: &str) -> &'static str {
    match key.rsplit('.').next().map(str::to_ascii_lowercase).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_mapping() {
        assert_eq!(content_type_for_key("media/a.jpg"), "image/jpeg");
        assert_eq!(content_type_for_key("media/a.PNG"), "image/png");
        assert_eq!(content_type_for_key("media/clip.mp4"), "video/mp4");
        assert_eq!(content_type_for_key("media/noext"), "application/octet-stream");
    }
}
