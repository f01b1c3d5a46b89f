//! Application state.
//!
//! One `AppState` is built at startup and shared across handlers. The post
//! store and object storage are held behind their traits so integration
//! tests can run the full router against in-memory and tempdir-backed
//! implementations.

use engage_captions::{CaptionGenerator, OpenAiChatClient};
use engage_core::Config;
use engage_db::{PgPostRepository, PostStore};
use engage_processing::upload::UploadCoordinator;
use engage_storage::{LocalStorage, ObjectStorage};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

use crate::sessions::SessionRegistry;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn ObjectStorage>,
    pub posts: Arc<dyn PostStore>,
    pub coordinator: UploadCoordinator,
    pub captions: Option<CaptionGenerator>,
    pub sessions: SessionRegistry,
}

impl AppState {
    /// Wire up production collaborators: Postgres, local object storage, and
    /// the chat-completion client when a key is configured.
    pub async fn initialize(config: Config) -> Result<Self, anyhow::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await?;
        sqlx::migrate!("../engage-db/migrations").run(&pool).await?;
        tracing::info!("Database ready");

        let storage: Arc<dyn ObjectStorage> = Arc::new(
            LocalStorage::new(
                config.local_storage_path.clone(),
                config.local_storage_base_url.clone(),
            )
            .await?,
        );
        let posts: Arc<dyn PostStore> = Arc::new(PgPostRepository::new(pool));

        let captions = match OpenAiChatClient::new(
            config.chat_completion_url.clone(),
            config.chat_completion_api_key.clone(),
            config.chat_completion_model.clone(),
        ) {
            Ok(client) => Some(CaptionGenerator::new(Arc::new(client))),
            Err(_) => {
                tracing::warn!("Caption generation disabled: no chat completion API key");
                None
            }
        };

        Ok(Self::assemble(config, storage, posts, captions))
    }

    /// Assemble state from explicit collaborators.
    pub fn assemble(
        config: Config,
        storage: Arc<dyn ObjectStorage>,
        posts: Arc<dyn PostStore>,
        captions: Option<CaptionGenerator>,
    ) -> Self {
        let coordinator = UploadCoordinator::new(storage.clone(), posts.clone());
        AppState {
            config,
            storage,
            posts,
            coordinator,
            captions,
            sessions: SessionRegistry::new(),
        }
    }
}
