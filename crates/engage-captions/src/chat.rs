//! Chat completion client for caption generation.

use async_trait::async_trait;
use engage_core::AppError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sampling temperature used for every caption request.
const TEMPERATURE: f64 = 0.7;
/// Completion token budget for three captions.
const MAX_TOKENS: u32 = 1000;
const SYSTEM_MESSAGE: &str = "You are a professional social media content creator.";

/// Caption generation errors
#[derive(Debug, Error)]
pub enum CaptionError {
    #[error("Chat completion API key is not configured")]
    MissingApiKey,

    #[error("Chat completion request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Chat completion returned status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("Chat completion returned no content")]
    EmptyCompletion,

    #[error("Chat completion returned too few distinct captions: {0}")]
    TooFewCaptions(usize),
}

impl From<CaptionError> for AppError {
    fn from(err: CaptionError) -> Self {
        match err {
            CaptionError::MissingApiKey => AppError::Internal(err.to_string()),
            other => AppError::Upstream(other.to_string()),
        }
    }
}

/// Abstraction over the completion provider so generation logic can be
/// tested without a network.
#[async_trait]
pub trait ChatCompletionClient: Send + Sync {
    /// Send one user prompt and return the raw completion text.
    async fn complete(&self, prompt: &str) -> Result<String, CaptionError>;
}

#[derive(Serialize)]
struct ChatRequestBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponseBody {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Client for OpenAI-compatible chat completion endpoints.
pub struct OpenAiChatClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
}

impl OpenAiChatClient {
    pub fn new(url: String, api_key: Option<String>, model: String) -> Result<Self, CaptionError> {
        let api_key = api_key.ok_or(CaptionError::MissingApiKey)?;
        Ok(OpenAiChatClient {
            http: reqwest::Client::new(),
            url,
            api_key,
            model,
        })
    }

    fn body<'a>(&'a self, prompt: &'a str) -> ChatRequestBody<'a> {
        ChatRequestBody {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_MESSAGE,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        }
    }
}

#[async_trait]
impl ChatCompletionClient for OpenAiChatClient {
    #[tracing::instrument(skip(self, prompt), fields(model = %self.model))]
    async fn complete(&self, prompt: &str) -> Result<String, CaptionError> {
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&self.body(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), "Chat completion request rejected");
            return Err(CaptionError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponseBody = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(CaptionError::EmptyCompletion)
    }
}
