//! Storage abstraction trait
//!
//! This module defines the ObjectStorage trait that all storage backends must
//! implement. The upload coordinator works against this trait and never
//! couples to backend details.

use crate::progress::ProgressTracker;
use async_trait::async_trait;
use bytes::Bytes;
use engage_core::AppError;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Object already exists under key: {0}")]
    DuplicateKey(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::upload("storage operation failed", err)
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// `put` has non-overwrite semantics: writing to an existing key fails with
/// [`StorageError::DuplicateKey`]. Keys are generated from 128-bit random
/// identifiers, so a duplicate indicates a bug rather than a tolerated race.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `data` under `key` and return the publicly-dereferenceable URL.
    ///
    /// When a progress tracker is supplied, the backend reports bytes
    /// transferred as the write proceeds and confirms completion only after
    /// the bytes are durable.
    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
        progress: Option<&ProgressTracker>,
    ) -> StorageResult<String>;

    /// Read an object's bytes back. Missing objects are
    /// [`StorageError::NotFound`].
    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// Check if an object exists under the given key.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Delete an object. Deleting a missing object is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Resolve the public URL for a key without touching the backend.
    fn public_url(&self, key: &str) -> String;
}
