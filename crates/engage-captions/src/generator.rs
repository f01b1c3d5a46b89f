//! Caption generator: prompt, completion, split, distinctness check.

use engage_core::constants::CAPTION_COUNT;
use engage_core::AppError;
use std::collections::HashSet;
use std::sync::Arc;

use crate::chat::{CaptionError, ChatCompletionClient};
use crate::prompt::{build_prompt, CaptionRequest};
use crate::split::split_captions;

/// Generates caption candidates for a post.
#[derive(Clone)]
pub struct CaptionGenerator {
    client: Arc<dyn ChatCompletionClient>,
}

impl CaptionGenerator {
    pub fn new(client: Arc<dyn ChatCompletionClient>) -> Self {
        CaptionGenerator { client }
    }

    /// Generate exactly three distinct captions.
    ///
    /// A completion that yields fewer than three distinct candidates is an
    /// upstream failure; the caller retries rather than receiving padding
    /// or duplicates.
    #[tracing::instrument(skip(self, request), fields(platform = %request.platform, niche = %request.niche))]
    pub async fn generate(&self, request: &CaptionRequest) -> Result<Vec<String>, AppError> {
        if request.niche.trim().is_empty() {
            return Err(AppError::Validation("niche must not be empty".to_string()));
        }

        let prompt = build_prompt(request);
        let completion = self.client.complete(&prompt).await.map_err(AppError::from)?;

        let captions = split_captions(&completion);
        let distinct: HashSet<&str> = captions.iter().map(|c| c.as_str()).collect();
        if captions.len() < CAPTION_COUNT || distinct.len() < CAPTION_COUNT {
            tracing::warn!(
                produced = captions.len(),
                distinct = distinct.len(),
                "Completion yielded too few distinct captions"
            );
            return Err(AppError::from(CaptionError::TooFewCaptions(distinct.len())));
        }

        tracing::info!(count = captions.len(), "Captions generated");
        Ok(captions)
    }
}
