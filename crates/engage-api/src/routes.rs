//! Route configuration.

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{captions, health, media, wizard};
use crate::state::AppState;

const API_PREFIX: &str = "/api/v0";

/// Build the application router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    // Multipart framing needs headroom beyond the raw file limit.
    let body_limit = state.config.max_file_size_bytes + 1024 * 1024;

    let sessions = Router::new()
        .route("/wizard/sessions", post(wizard::create_session))
        .route(
            "/wizard/sessions/{id}",
            get(wizard::get_session).delete(wizard::delete_session),
        )
        .route(
            "/wizard/sessions/{id}/media",
            post(wizard::upload_media).delete(wizard::clear_media),
        )
        .route("/wizard/sessions/{id}/rotate", post(wizard::rotate))
        .route("/wizard/sessions/{id}/crop", put(wizard::set_crop))
        .route("/wizard/sessions/{id}/selection", put(wizard::select))
        .route("/wizard/sessions/{id}/next", post(wizard::next_step))
        .route("/wizard/sessions/{id}/back", post(wizard::back_step))
        .route("/wizard/sessions/{id}/complete", post(wizard::complete))
        .route("/captions/generate", post(captions::generate_captions));

    Router::new()
        .route("/health", get(health::health))
        .route("/media/{*key}", get(media::serve_media))
        .nest(API_PREFIX, sessions)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

fn cors_layer(config: &engage_core::Config) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::PUT, Method::DELETE];

    if config.cors_origins.iter().any(|origin| origin == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    }
}
