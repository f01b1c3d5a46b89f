//! Transform engine: crop, rotate, re-encode.

pub mod engine;

pub use engine::{TransformEngine, TransformError};
