//! Configuration module
//!
//! This module provides environment-driven configuration for the API and
//! services: server, database, storage, upload limits, and the keys for the
//! caption-generation and vision collaborators. The chat-completion key is
//! held server-side only and never exposed to clients.

use std::env;

const DEFAULT_MAX_FILE_SIZE_MB: usize = 25;
const DEFAULT_CHAT_COMPLETION_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub database_url: String,
    // Storage configuration
    pub local_storage_path: String,
    pub local_storage_base_url: String,
    // Upload limits
    pub max_file_size_bytes: usize,
    pub allowed_content_types: Vec<String>,
    // Caption generation (chat-completion collaborator)
    pub chat_completion_api_key: Option<String>,
    pub chat_completion_url: String,
    pub chat_completion_model: String,
    // Vision-analysis collaborator
    pub vision_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let cors_origins = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_FILE_SIZE_MB);

        let allowed_content_types = env::var("ALLOWED_CONTENT_TYPES")
            .unwrap_or_else(|_| {
                "image/jpeg,image/png,image/webp,image/gif,video/mp4,video/webm".to_string()
            })
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Config {
            server_port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            cors_origins,
            environment,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/engage".to_string()),
            local_storage_path: env::var("LOCAL_STORAGE_PATH")
                .unwrap_or_else(|_| "./data/media".to_string()),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000/media".to_string()),
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            allowed_content_types,
            chat_completion_api_key: env::var("OPENAI_API_KEY").ok(),
            chat_completion_url: env::var("CHAT_COMPLETION_URL")
                .unwrap_or_else(|_| DEFAULT_CHAT_COMPLETION_URL.to_string()),
            chat_completion_model: env::var("CHAT_COMPLETION_MODEL")
                .unwrap_or_else(|_| DEFAULT_CHAT_MODEL.to_string()),
            vision_api_key: env::var("VISION_API_KEY").ok(),
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_file_size_bytes == 0 {
            anyhow::bail!("MAX_FILE_SIZE_MB must be greater than zero");
        }
        if self.allowed_content_types.is_empty() {
            anyhow::bail!("ALLOWED_CONTENT_TYPES must not be empty");
        }
        if self.is_production() && self.chat_completion_api_key.is_none() {
            anyhow::bail!("OPENAI_API_KEY is required in production");
        }
        Ok(())
    }
}
