//! Shared application state and provider wiring.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use moodlift_core::provider::EmotionSource;
use moodlift_core::{CommunityMemeResolver, MediaResolutionCascade, SessionState};
use moodlift_interaction::{GeminiClient, GiphyClient, RedditFeed};

use crate::capture::FrameCapture;
use crate::classifier::VisionEmotionClassifier;
use crate::config::Config;

/// Everything the handlers need, injected explicitly.
///
/// The session is the only mutable piece; it lives behind one mutex whose
/// writes are confined to the cascade's state-update step and the
/// analyze handler's emotion write.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<SessionState>>,
    pub cascade: Arc<MediaResolutionCascade>,
    pub community: Arc<CommunityMemeResolver>,
    pub emotion_source: Option<Arc<dyn EmotionSource>>,
    pub gemini: Option<Arc<GeminiClient>>,
}

impl AppState {
    /// Wires providers from the config. Missing API keys disable the
    /// corresponding provider without failing startup.
    pub fn from_config(config: &Config) -> Self {
        let session = Arc::new(Mutex::new(SessionState::default()));

        let gemini = config.gemini_api_key.as_ref().map(|key| {
            let mut client = GeminiClient::new(key);
            if let Some(model) = &config.gemini_model {
                client = client.with_model(model);
            }
            Arc::new(client)
        });
        if gemini.is_none() {
            info!("GEMINI_API_KEY absent; search-term generation, analysis and transcription disabled");
        }

        let mut cascade = MediaResolutionCascade::new(session.clone());
        if let Some(gemini) = &gemini {
            cascade = cascade.with_term_generator(gemini.clone());
        }
        match &config.giphy_api_key {
            Some(key) => {
                cascade = cascade.with_source(Arc::new(GiphyClient::new(key)));
            }
            None => info!("GIPHY_API_KEY absent; resolution uses the static fallback table"),
        }

        let community = Arc::new(CommunityMemeResolver::new(Arc::new(RedditFeed::new())));

        let emotion_source = gemini.clone().map(|gemini| {
            Arc::new(VisionEmotionClassifier::new(
                FrameCapture::new(&config.capture_command),
                gemini,
            )) as Arc<dyn EmotionSource>
        });

        Self {
            session,
            cascade: Arc::new(cascade),
            community,
            emotion_source,
            gemini,
        }
    }
}
