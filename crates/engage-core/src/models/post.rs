//! Post records and the closed attribute vocabularies collected by the
//! wizard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Social platform a post targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    Instagram,
    LinkedIn,
    Facebook,
    Twitter,
    TikTok,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Instagram,
        Platform::LinkedIn,
        Platform::Facebook,
        Platform::Twitter,
        Platform::TikTok,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Instagram => "Instagram",
            Platform::LinkedIn => "LinkedIn",
            Platform::Facebook => "Facebook",
            Platform::Twitter => "Twitter",
            Platform::TikTok => "TikTok",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown platform: {}", s))
    }
}

/// What the user wants the post to achieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Goal {
    Sales,
    #[serde(rename = "Drive Engagement")]
    DriveEngagement,
    #[serde(rename = "Grow Followers")]
    GrowFollowers,
    #[serde(rename = "Share Knowledge")]
    ShareKnowledge,
    #[serde(rename = "Brand Awareness")]
    BrandAwareness,
}

impl Goal {
    pub const ALL: [Goal; 5] = [
        Goal::Sales,
        Goal::DriveEngagement,
        Goal::GrowFollowers,
        Goal::ShareKnowledge,
        Goal::BrandAwareness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::Sales => "Sales",
            Goal::DriveEngagement => "Drive Engagement",
            Goal::GrowFollowers => "Grow Followers",
            Goal::ShareKnowledge => "Share Knowledge",
            Goal::BrandAwareness => "Brand Awareness",
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Goal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Goal::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown goal: {}", s))
    }
}

/// Voice the generated captions should carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tone {
    Professional,
    Casual,
    Humorous,
    Persuasive,
    Inspirational,
}

impl Tone {
    pub const ALL: [Tone; 5] = [
        Tone::Professional,
        Tone::Casual,
        Tone::Humorous,
        Tone::Persuasive,
        Tone::Inspirational,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "Professional",
            Tone::Casual => "Casual",
            Tone::Humorous => "Humorous",
            Tone::Persuasive => "Persuasive",
            Tone::Inspirational => "Inspirational",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tone::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown tone: {}", s))
    }
}

/// Persisted row representing one shareable post.
///
/// Created with a placeholder platform the moment upload succeeds; the wizard
/// completion phase fills platform, niche, goal, and tone. The `id` is the
/// join key between the upload phase and the completion phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: Uuid,
    pub image_url: String,
    pub platform: String,
    pub niche: Option<String>,
    pub goal: Option<String>,
    pub tone: Option<String>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Fields required to insert a new post record.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub image_url: String,
    pub platform: String,
    pub user_id: Uuid,
}

/// The attribute set written against a post on wizard completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostAttributes {
    pub platform: Platform,
    pub niche: String,
    pub goal: Goal,
    pub tone: Tone,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_round_trip() {
        for platform in Platform::ALL {
            assert_eq!(platform.as_str().parse::<Platform>().unwrap(), platform);
        }
        assert!("MySpace".parse::<Platform>().is_err());
    }

    #[test]
    fn test_goal_serde_uses_display_names() {
        let json = serde_json::to_string(&Goal::DriveEngagement).unwrap();
        assert_eq!(json, "\"Drive Engagement\"");
        let goal: Goal = serde_json::from_str("\"Brand Awareness\"").unwrap();
        assert_eq!(goal, Goal::BrandAwareness);
    }

    #[test]
    fn test_tone_parse_is_case_insensitive() {
        assert_eq!("casual".parse::<Tone>().unwrap(), Tone::Casual);
    }
}
