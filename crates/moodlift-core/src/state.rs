//! Process-wide session state.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::emotion::EmotionLabel;

/// The last-write-wins view of the most recent resolution.
///
/// One instance per process, shared behind `Arc<tokio::sync::Mutex<_>>`.
/// Read by the status endpoints; `last_media_url` and `last_fetched_at` are
/// written only by the cascade, `last_emotion` by the analyze handler.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub last_emotion: EmotionLabel,
    pub last_media_url: String,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

impl SessionState {
    /// Whether a non-forced resolution at `now` falls inside the debounce
    /// window and should reuse the previous media.
    pub fn within_debounce(&self, now: DateTime<Utc>, window: Duration) -> bool {
        match self.last_fetched_at {
            Some(last) => now - last < window,
            None => false,
        }
    }

    /// The view the status endpoints serialize.
    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            emotion: self.last_emotion.clone(),
            meme_url: self.last_media_url.clone(),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            last_emotion: EmotionLabel::neutral(),
            last_media_url: String::new(),
            last_fetched_at: None,
        }
    }
}

/// JSON shape of the `/status` and `/analyze_mood` responses.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub emotion: EmotionLabel,
    pub meme_url: String,
}
