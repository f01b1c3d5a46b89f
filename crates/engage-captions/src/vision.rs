//! Image annotations fed into the caption prompt as context.

use serde::{Deserialize, Serialize};

/// What an image analysis pass saw in the uploaded media.
///
/// All fields are optional context; an empty annotation is valid and simply
/// contributes nothing to the prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageAnnotation {
    /// Scene and subject labels, most confident first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,

    /// Dominant colors as CSS-style hex strings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dominant_colors: Vec<String>,

    /// Number of detected faces.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub face_count: u32,

    /// Discrete objects located in the frame.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objects: Vec<String>,

    /// Text recognized in the image, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_text: Option<String>,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

impl ImageAnnotation {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
            && self.dominant_colors.is_empty()
            && self.face_count == 0
            && self.objects.is_empty()
            && self.detected_text.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_annotation_serializes_to_empty_object() {
        let annotation = ImageAnnotation::default();
        assert!(annotation.is_empty());
        assert_eq!(serde_json::to_string(&annotation).unwrap(), "{}");
    }

    #[test]
    fn test_populated_annotation_round_trips() {
        let annotation = ImageAnnotation {
            labels: vec!["gym".to_string(), "outdoors".to_string()],
            dominant_colors: vec!["#1a2b3c".to_string()],
            face_count: 2,
            objects: vec!["dumbbell".to_string()],
            detected_text: Some("No excuses".to_string()),
        };
        let json = serde_json::to_string(&annotation).unwrap();
        let parsed: ImageAnnotation = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, annotation);
    }
}
