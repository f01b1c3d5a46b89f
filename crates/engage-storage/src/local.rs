use crate::progress::ProgressTracker;
use crate::traits::{ObjectStorage, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

const WRITE_CHUNK_SIZE: usize = 64 * 1024;

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for object storage (e.g., "./data/media")
    /// * `base_url` - Base URL for serving objects (e.g., "http://localhost:3000/media")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert storage key to filesystem path with security validation
    ///
    /// Rejects keys containing path traversal sequences that could escape the
    /// base storage directory.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.contains("..") || key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        Ok(self.base_path.join(key))
    }

    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
        progress: Option<&ProgressTracker>,
    ) -> StorageResult<String> {
        let path = self.key_to_path(key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        // create_new gives the non-overwrite guarantee: an existing object
        // under this key fails the whole put.
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => StorageError::DuplicateKey(key.to_string()),
                _ => StorageError::UploadFailed(format!(
                    "Failed to create file {}: {}",
                    path.display(),
                    e
                )),
            })?;

        let mut written: u64 = 0;
        for chunk in data.chunks(WRITE_CHUNK_SIZE) {
            file.write_all(chunk).await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to write file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            written += chunk.len() as u64;
            if let Some(tracker) = progress {
                tracker.transferred(written);
            }
        }

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        if let Some(tracker) = progress {
            tracker.confirm_complete();
        }

        let url = self.generate_url(key);

        tracing::info!(
            path = %path.display(),
            key = %key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage put successful"
        );

        Ok(url)
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        let path = self.key_to_path(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::BackendError(format!(
                "Failed to read file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::BackendError(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::info!(key = %key, "Local storage delete successful");

        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        self.generate_url(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{ProgressSink, ProgressTracker};
    use engage_core::models::UploadProgress;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    #[derive(Default)]
    struct CollectSink(Mutex<Vec<UploadProgress>>);

    impl ProgressSink for CollectSink {
        fn report(&self, progress: UploadProgress) {
            self.0.lock().unwrap().push(progress);
        }
    }

    async fn test_storage(dir: &tempfile::TempDir) -> LocalStorage {
        LocalStorage::new(dir.path(), "http://localhost:3000/media".to_string())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_put_and_exists() {
        let dir = tempdir().unwrap();
        let storage = test_storage(&dir).await;

        let url = storage
            .put(
                "media/test.jpg",
                Bytes::from_static(b"jpeg bytes"),
                "image/jpeg",
                None,
            )
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:3000/media/media/test.jpg");
        assert!(storage.exists("media/test.jpg").await.unwrap());
        assert!(!storage.exists("media/other.jpg").await.unwrap());

        let data = storage.get("media/test.jpg").await.unwrap();
        assert_eq!(data, Bytes::from_static(b"jpeg bytes"));
        assert!(matches!(
            storage.get("media/other.jpg").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_put_rejects_duplicate_key() {
        let dir = tempdir().unwrap();
        let storage = test_storage(&dir).await;

        storage
            .put("media/dup.png", Bytes::from_static(b"one"), "image/png", None)
            .await
            .unwrap();

        let result = storage
            .put("media/dup.png", Bytes::from_static(b"two"), "image/png", None)
            .await;
        assert!(matches!(result, Err(StorageError::DuplicateKey(_))));
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = test_storage(&dir).await;

        let result = storage
            .put(
                "../../../etc/passwd",
                Bytes::from_static(b"x"),
                "text/plain",
                None,
            )
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.exists("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_delete_nonexistent_is_ok() {
        let dir = tempdir().unwrap();
        let storage = test_storage(&dir).await;

        assert!(storage.delete("media/nothing.jpg").await.is_ok());
    }

    #[tokio::test]
    async fn test_put_reports_monotone_progress() {
        let dir = tempdir().unwrap();
        let storage = test_storage(&dir).await;

        // Three full chunks plus a partial one.
        let data = Bytes::from(vec![7u8; WRITE_CHUNK_SIZE * 3 + 100]);
        let total = data.len() as u64;
        let sink = Arc::new(CollectSink::default());
        let tracker = ProgressTracker::new(total, sink.clone());

        storage
            .put("media/chunked.bin", data, "application/octet-stream", Some(&tracker))
            .await
            .unwrap();

        let events = sink.0.lock().unwrap().clone();
        let mut last = 0;
        for event in &events {
            assert!(event.bytes_sent >= last);
            assert_eq!(event.bytes_total, total);
            last = event.bytes_sent;
        }
        // 100 percent appears exactly once, as the final confirmed event.
        assert_eq!(events.iter().filter(|e| e.percent() == 100).count(), 1);
        assert_eq!(events.last().unwrap().percent(), 100);
    }
}
