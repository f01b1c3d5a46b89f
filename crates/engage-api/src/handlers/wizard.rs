//! Wizard session endpoints.
//!
//! Each handler resolves the session from the registry, delegates to the
//! session, and returns either the call's outcome or a fresh state snapshot.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use engage_core::models::{CropRegion, Goal, Platform, Tone};
use engage_core::AppError;
use engage_processing::capture::DroppedFile;
use engage_wizard::{NextOutcome, Selection, WizardSession, WizardStateView, WizardStep};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSessionBody {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub state: WizardStateView,
}

/// Start a new post-creation session for a user.
#[tracing::instrument(skip(state, body), fields(user_id = %body.user_id, operation = "create_session"))]
pub async fn create_session(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreateSessionBody>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), HttpAppError> {
    let session = WizardSession::new(
        state.coordinator.clone(),
        state.posts.clone(),
        body.user_id,
    );
    let view = session.state().await;
    let session_id = state.sessions.insert(session);

    tracing::info!(session_id = %session_id, "Session created");
    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id,
            state: view,
        }),
    ))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardStateView>, HttpAppError> {
    let session = state.sessions.get(id)?;
    Ok(Json(session.state().await))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HttpAppError> {
    if state.sessions.remove(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("session {} not found", id)).into())
    }
}

/// Attach media from a multipart form. The first `file` field wins; size
/// and content-type limits come from configuration.
#[tracing::instrument(skip(state, multipart), fields(session_id = %id, operation = "upload_session_media"))]
pub async fn upload_media(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<WizardStateView>, HttpAppError> {
    let session = state.sessions.get(id)?;

    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::InvalidInput(format!("Invalid multipart body: {}", e))
    })? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await.map_err(|e| {
            AppError::InvalidInput(format!("Failed to read file field: {}", e))
        })?;

        if data.len() > state.config.max_file_size_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "File exceeds the {} MB limit",
                state.config.max_file_size_bytes / 1024 / 1024
            ))
            .into());
        }
        if !state
            .config
            .allowed_content_types
            .iter()
            .any(|allowed| allowed == &content_type)
        {
            return Err(AppError::InvalidInput(format!(
                "Unsupported content type: {}",
                content_type
            ))
            .into());
        }

        files.push(DroppedFile {
            data,
            content_type,
            filename,
        });
    }

    if files.is_empty() {
        return Err(AppError::InvalidInput("No file field in request".to_string()).into());
    }
    if !session.drop_files(files).await {
        return Err(AppError::InvalidInput("Unsupported media type".to_string()).into());
    }

    Ok(Json(session.state().await))
}

pub async fn clear_media(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardStateView>, HttpAppError> {
    let session = state.sessions.get(id)?;
    session.clear_media().await;
    Ok(Json(session.state().await))
}

#[derive(Debug, Serialize)]
pub struct RotateResponse {
    pub rotation_degrees: u16,
}

/// Advance the rotation by a quarter turn.
pub async fn rotate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RotateResponse>, HttpAppError> {
    let session = state.sessions.get(id)?;
    let rotation = session.rotate().await;
    Ok(Json(RotateResponse {
        rotation_degrees: rotation.degrees(),
    }))
}

/// Set or clear the crop region. Bounds are validated at transform time.
pub async fn set_crop(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(crop): ValidatedJson<Option<CropRegion>>,
) -> Result<Json<WizardStateView>, HttpAppError> {
    let session = state.sessions.get(id)?;
    session.set_crop(crop).await;
    Ok(Json(session.state().await))
}

#[derive(Debug, Deserialize)]
pub struct SelectionBody {
    pub platform: Option<Platform>,
    pub niche: Option<String>,
    pub goal: Option<Goal>,
    pub tone: Option<Tone>,
}

/// Record attribute selections. Fields may arrive one per request as the
/// user moves through the steps, or several at once.
pub async fn select(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(body): ValidatedJson<SelectionBody>,
) -> Result<Json<WizardStateView>, HttpAppError> {
    let session = state.sessions.get(id)?;

    if let Some(platform) = body.platform {
        session.select(Selection::Platform(platform)).await?;
    }
    if let Some(niche) = body.niche {
        session.select(Selection::Niche(niche)).await?;
    }
    if let Some(goal) = body.goal {
        session.select(Selection::Goal(goal)).await?;
    }
    if let Some(tone) = body.tone {
        session.select(Selection::Tone(tone)).await?;
    }

    Ok(Json(session.state().await))
}

#[derive(Debug, Serialize)]
pub struct NextResponse {
    pub outcome: NextOutcome,
    pub state: WizardStateView,
}

pub async fn next_step(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<NextResponse>, HttpAppError> {
    let session = state.sessions.get(id)?;
    let outcome = session.next().await?;
    Ok(Json(NextResponse {
        outcome,
        state: session.state().await,
    }))
}

#[derive(Debug, Serialize)]
pub struct BackResponse {
    pub step: WizardStep,
}

pub async fn back_step(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BackResponse>, HttpAppError> {
    let session = state.sessions.get(id)?;
    let step = session.back().await?;
    Ok(Json(BackResponse { step }))
}

#[derive(Debug, Serialize)]
pub struct CompleteResponse {
    pub post_id: Uuid,
}

/// Persist the selected attributes onto the uploaded post.
#[tracing::instrument(skip(state), fields(session_id = %id, operation = "complete_session"))]
pub async fn complete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CompleteResponse>, HttpAppError> {
    let session = state.sessions.get(id)?;
    let post_id = session.complete().await?;
    Ok(Json(CompleteResponse { post_id }))
}
