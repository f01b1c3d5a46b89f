//! The post persistence trait.

use async_trait::async_trait;
use engage_core::models::{NewPost, PostAttributes, PostRecord};
use engage_core::AppError;
use uuid::Uuid;

/// Persistence collaborator for post records.
///
/// `insert` runs once upload has durably stored the media bytes; it must
/// return the created record including its generated id, which later joins
/// the wizard completion phase to the upload phase.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Insert a new post record and return it with its generated id.
    async fn insert(&self, new_post: NewPost) -> Result<PostRecord, AppError>;

    /// Write the wizard-collected attributes against an existing record.
    async fn update_attributes(
        &self,
        id: Uuid,
        attributes: &PostAttributes,
    ) -> Result<(), AppError>;

    /// Fetch a record by id.
    async fn get(&self, id: Uuid) -> Result<Option<PostRecord>, AppError>;
}
