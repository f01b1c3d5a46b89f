//! Prompt construction for caption generation.

use engage_core::models::{Goal, Platform, Tone};
use serde::Deserialize;

use crate::vision::ImageAnnotation;

/// Everything needed to generate captions for one post.
#[derive(Debug, Clone, Deserialize)]
pub struct CaptionRequest {
    pub platform: Platform,
    pub niche: String,
    pub goal: Goal,
    pub tone: Tone,
    #[serde(default)]
    pub image_context: Option<ImageAnnotation>,
}

/// Build the user prompt for the chat completion call.
///
/// The persona, the three-caption structure, the character-limit and hashtag
/// directives, and the trailing notes are part of the product behavior and
/// are kept stable; only the attribute values and the serialized image
/// context vary per request.
pub fn build_prompt(request: &CaptionRequest) -> String {
    let image_context = match &request.image_context {
        Some(annotation) if !annotation.is_empty() => {
            serde_json::to_string(annotation).unwrap_or_else(|_| "null".to_string())
        }
        _ => "null".to_string(),
    };

    format!(
        "You are the world's leading content creator and digital marketing expert \
with 20 years of hands-on experience. Your goal is to create 3 detailed and \
creative social media post captions for the {niche} industry, designed to \
achieve the goal of {goal} in a {tone} tone, taking into consideration the \
following image context: {image_context}.\n\
\n\
The captions must:\n\
1. Ensure captions are concise and meet {platform}'s character limits \
(e.g., Instagram: 2200 characters, Twitter: 280 characters).\n\
2. Incorporate hashtags that are highly relevant to the {niche} industry to \
maximize visibility and engagement.\n\
3. Include an optional, effective call-to-action to inspire engagement \
(e.g., \"Comment below,\" \"Tag a friend,\" \"Share your thoughts\").\n\
4. Reflect current trends, use platform-specific language, and include emojis \
where appropriate to match audience expectations and boost relatability.\n\
\n\
[A creative, catchy title highlighting the post's theme in bold.]\n\
as a paragraph ready to be shared.\n\
[Write a 1-2 sentence caption in a {tone} tone, including hashtags. Provide a \
clear and actionable CTA encouraging user engagement.]\n\
\n\
[Another engaging and unique title for the post in bold.]\n\
as a paragraph ready to be shared.\n\
[Craft an attention-grabbing caption that resonates with {platform}'s \
audience, with relevant hashtags. Add a compelling CTA to inspire interaction.]\n\
\n\
[A third compelling and innovative title idea in bold.]\n\
as a paragraph ready to be shared.\n\
[Provide a brief but impactful caption using hashtags and keeping the {tone} \
tone. Suggest an actionable CTA to encourage user engagement and sharing.]\n\
\n\
Important notes:\n\
- Separate each caption with a blank line.\n\
- Captions must be practical, innovative, and specifically tailored to the \
{niche} industry.\n\
- Ensure all captions reflect the latest trends and best practices for \
content creation on {platform}.\n",
        niche = request.niche,
        goal = request.goal,
        tone = request.tone,
        platform = request.platform,
        image_context = image_context,
    )
}
