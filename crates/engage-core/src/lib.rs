//! Core types for the engage post-creation pipeline.
//!
//! This crate holds the pieces shared by every other crate in the workspace:
//! the unified error type, environment-driven configuration, and the domain
//! models for media capture, transformation, upload, and post records.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
