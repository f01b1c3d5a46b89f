//! Upload coordinator: store the final bytes, then register the post record.
//!
//! Every step is a hard sequence point; a later step never runs if an
//! earlier one failed. No post record is ever created until storage has
//! durably confirmed the bytes - a record must never reference an object
//! that does not exist. The converse is tolerated: if record creation fails
//! after the bytes landed, the orphaned object is acceptable garbage.

use engage_core::constants::PLACEHOLDER_PLATFORM;
use engage_core::models::{NewPost, PostRecord, TransformResult};
use engage_core::AppError;
use engage_db::PostStore;
use engage_storage::{generate_object_key, ObjectStorage, ProgressTracker};
use std::sync::Arc;
use uuid::Uuid;

/// Streams transform results to object storage with progress reporting, then
/// registers a post record pointing at the stored object.
#[derive(Clone)]
pub struct UploadCoordinator {
    storage: Arc<dyn ObjectStorage>,
    posts: Arc<dyn PostStore>,
}

impl UploadCoordinator {
    pub fn new(storage: Arc<dyn ObjectStorage>, posts: Arc<dyn PostStore>) -> Self {
        UploadCoordinator { storage, posts }
    }

    /// Upload the final bytes and create the post record.
    ///
    /// Steps, in order: generate a unique storage key; non-overwriting put
    /// with byte progress; resolve the public URL; insert the record with
    /// the placeholder platform. Any failure aborts the remainder and
    /// surfaces as `UploadFailed` with the underlying cause.
    #[tracing::instrument(skip(self, result, progress), fields(owner_id = %owner_id, operation = "upload_media"))]
    pub async fn upload(
        &self,
        result: &TransformResult,
        owner_id: Uuid,
        progress: Option<&ProgressTracker>,
    ) -> Result<PostRecord, AppError> {
        let key = generate_object_key(&result.extension());

        let url = self
            .storage
            .put(&key, result.data.clone(), &result.content_type, progress)
            .await
            .map_err(|e| AppError::upload("failed to store media object", e))?;

        let record = self
            .posts
            .insert(NewPost {
                image_url: url.clone(),
                platform: PLACEHOLDER_PLATFORM.to_string(),
                user_id: owner_id,
            })
            .await
            .map_err(|e| AppError::upload("failed to register post record", e))?;

        tracing::info!(
            key = %key,
            url = %url,
            post_id = %record.id,
            size_bytes = result.data.len(),
            "Upload complete"
        );

        Ok(record)
    }
}
