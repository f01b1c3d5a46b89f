//! Caption generation endpoint.

use axum::{extract::State, Json};
use engage_captions::CaptionRequest;
use engage_core::AppError;
use serde::Serialize;

use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CaptionsResponse {
    pub captions: Vec<String>,
}

/// Generate three caption candidates for the given post attributes.
///
/// Missing or malformed attributes reject with 400 before any provider
/// call; provider failures surface as 500 with a retryable error body.
#[tracing::instrument(skip(state, request), fields(platform = %request.platform, operation = "generate_captions"))]
pub async fn generate_captions(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CaptionRequest>,
) -> Result<Json<CaptionsResponse>, HttpAppError> {
    let generator = state.captions.as_ref().ok_or_else(|| {
        AppError::Internal("caption generation is not configured".to_string())
    })?;

    let captions = generator.generate(&request).await?;
    Ok(Json(CaptionsResponse { captions }))
}
