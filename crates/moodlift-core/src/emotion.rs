//! Emotion label domain type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The closed label set the facial classifier emits.
///
/// Labels outside this set are still carried verbatim; they resolve through
/// the default fallback entry instead of erroring.
pub const KNOWN_EMOTIONS: [&str; 7] = [
    "happy", "sad", "angry", "fear", "neutral", "surprise", "disgust",
];

/// The label every unknown emotion resolves through.
pub const DEFAULT_EMOTION: &str = "neutral";

/// A discrete emotion tag, lowercase-normalized at construction.
///
/// Deliberately not validated against [`KNOWN_EMOTIONS`]: the classifier is
/// an external collaborator and the rest of the pipeline only uses the tag
/// as a lookup key with a default entry behind it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmotionLabel(String);

impl EmotionLabel {
    /// Creates a label, trimming and lowercasing the tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into().trim().to_lowercase())
    }

    /// The designated default label.
    pub fn neutral() -> Self {
        Self(DEFAULT_EMOTION.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the tag is part of the classifier's closed set.
    pub fn is_known(&self) -> bool {
        KNOWN_EMOTIONS.contains(&self.0.as_str())
    }
}

impl Default for EmotionLabel {
    fn default() -> Self {
        Self::neutral()
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EmotionLabel {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes() {
        let label = EmotionLabel::new("  Angry ");
        assert_eq!(label.as_str(), "angry");
        assert!(label.is_known());
    }

    #[test]
    fn test_unknown_label_is_carried() {
        let label = EmotionLabel::new("perplexed");
        assert_eq!(label.as_str(), "perplexed");
        assert!(!label.is_known());
    }

    #[test]
    fn test_default_is_neutral() {
        assert_eq!(EmotionLabel::default(), EmotionLabel::neutral());
        assert_eq!(EmotionLabel::neutral().as_str(), DEFAULT_EMOTION);
    }

    #[test]
    fn test_serde_transparent() {
        let label: EmotionLabel = serde_json::from_str("\"sad\"").unwrap();
        assert_eq!(label, EmotionLabel::new("sad"));
        assert_eq!(serde_json::to_string(&label).unwrap(), "\"sad\"");
    }
}
