//! In-memory post store for tests.

use async_trait::async_trait;
use chrono::Utc;
use engage_core::models::{NewPost, PostAttributes, PostRecord};
use engage_core::AppError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use crate::store::PostStore;

/// In-memory [`PostStore`] used by unit and integration tests.
///
/// Supports failure injection so completion-retry paths can be exercised.
#[derive(Default)]
pub struct MemoryPostStore {
    posts: Mutex<HashMap<Uuid, PostRecord>>,
    fail_next_insert: AtomicBool,
    fail_next_update: AtomicBool,
    update_calls: AtomicUsize,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `insert` fail with a database error.
    pub fn fail_next_insert(&self) {
        self.fail_next_insert.store(true, Ordering::SeqCst);
    }

    /// Make the next `update_attributes` fail with a database error.
    pub fn fail_next_update(&self) {
        self.fail_next_update.store(true, Ordering::SeqCst);
    }

    /// Number of `update_attributes` calls, successful or not.
    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn insert(&self, new_post: NewPost) -> Result<PostRecord, AppError> {
        if self.fail_next_insert.swap(false, Ordering::SeqCst) {
            return Err(AppError::Database("injected insert failure".to_string()));
        }

        let record = PostRecord {
            id: Uuid::new_v4(),
            image_url: new_post.image_url,
            platform: new_post.platform,
            niche: None,
            goal: None,
            tone: None,
            user_id: new_post.user_id,
            created_at: Utc::now(),
        };
        self.posts.lock().unwrap().insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_attributes(
        &self,
        id: Uuid,
        attributes: &PostAttributes,
    ) -> Result<(), AppError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_next_update.swap(false, Ordering::SeqCst) {
            return Err(AppError::Database("injected update failure".to_string()));
        }

        let mut posts = self.posts.lock().unwrap();
        let record = posts
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("post {} not found", id)))?;
        record.platform = attributes.platform.as_str().to_string();
        record.niche = Some(attributes.niche.clone());
        record.goal = Some(attributes.goal.as_str().to_string());
        record.tone = Some(attributes.tone.as_str().to_string());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<PostRecord>, AppError> {
        Ok(self.posts.lock().unwrap().get(&id).cloned())
    }
}
