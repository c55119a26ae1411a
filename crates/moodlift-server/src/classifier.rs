//! Facial-emotion classification over a captured frame.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use moodlift_core::emotion::EmotionLabel;
use moodlift_core::error::ProviderError;
use moodlift_core::provider::EmotionSource;
use moodlift_interaction::GeminiClient;

use crate::capture::FrameCapture;

/// Grabs one webcam frame and asks the vision model for an emotion label.
pub struct VisionEmotionClassifier {
    capture: FrameCapture,
    gemini: Arc<GeminiClient>,
}

impl VisionEmotionClassifier {
    pub fn new(capture: FrameCapture, gemini: Arc<GeminiClient>) -> Self {
        Self { capture, gemini }
    }
}

#[async_trait]
impl EmotionSource for VisionEmotionClassifier {
    async fn detect(&self) -> Result<EmotionLabel, ProviderError> {
        let frame = self
            .capture
            .grab_frame()
            .await
            .map_err(|err| ProviderError::Request(format!("frame capture: {err}")))?;
        let emotion = self.gemini.classify_emotion("image/jpeg", &frame).await?;
        info!(emotion = %emotion, "detected emotion");
        Ok(emotion)
    }
}
