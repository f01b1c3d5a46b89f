//! Request handlers.

pub mod captions;
pub mod health;
pub mod media;
pub mod wizard;
