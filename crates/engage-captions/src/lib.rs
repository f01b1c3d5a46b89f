//! Caption generation.
//!
//! Builds the marketing prompt from the post attributes and optional image
//! annotations, sends it to an OpenAI-compatible chat completion endpoint,
//! and splits the completion into exactly three distinct caption candidates.

pub mod chat;
pub mod generator;
pub mod prompt;
pub mod split;
pub mod vision;

pub use chat::{CaptionError, ChatCompletionClient, OpenAiChatClient};
pub use generator::CaptionGenerator;
pub use prompt::{build_prompt, CaptionRequest};
pub use split::split_captions;
pub use vision::ImageAnnotation;
