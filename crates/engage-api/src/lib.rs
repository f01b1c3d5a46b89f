//! HTTP surface for the post-creation service.
//!
//! Exposes the wizard session lifecycle, media upload and transformation
//! inputs, stored-media retrieval, and caption generation over axum. Route
//! construction is separated from process startup so integration tests can
//! drive the router directly.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod sessions;
pub mod state;
pub mod telemetry;

pub use routes::build_router;
pub use state::AppState;
