//! Mood-to-media resolution cascade.
//!
//! Given an emotion label, produces a media URL by trying providers in
//! priority order: an optional search-term generator refines the query, an
//! ordered list of media sources is tried in sequence, and the static
//! fallback table catches everything else. A time-keyed debounce suppresses
//! repeat triggers unless the caller forces a re-resolution.

use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use chrono::{Duration, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::emotion::EmotionLabel;
use crate::fallback::FallbackTable;
use crate::media::MediaResult;
use crate::provider::{MediaSource, SearchTermGenerator};
use crate::state::SessionState;

/// Minimum elapsed time between non-forced resolutions.
pub const DEBOUNCE_SECONDS: i64 = 20;

/// The cascade and the session state it owns the writes to.
pub struct MediaResolutionCascade {
    state: Arc<Mutex<SessionState>>,
    term_generator: Option<Arc<dyn SearchTermGenerator>>,
    sources: Vec<Arc<dyn MediaSource>>,
    fallback: FallbackTable,
    debounce: Duration,
    rng: StdMutex<StdRng>,
}

impl MediaResolutionCascade {
    /// Creates a cascade with no external providers: every resolution goes
    /// straight to the fallback table.
    pub fn new(state: Arc<Mutex<SessionState>>) -> Self {
        Self {
            state,
            term_generator: None,
            sources: Vec::new(),
            fallback: FallbackTable::default(),
            debounce: Duration::seconds(DEBOUNCE_SECONDS),
            rng: StdMutex::new(StdRng::from_entropy()),
        }
    }

    /// Sets the optional search-term generator (an LLM, in production).
    pub fn with_term_generator(mut self, generator: Arc<dyn SearchTermGenerator>) -> Self {
        self.term_generator = Some(generator);
        self
    }

    /// Appends a media source strategy. Sources are tried in insertion order.
    pub fn with_source(mut self, source: Arc<dyn MediaSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Overrides the fallback table.
    pub fn with_fallback_table(mut self, table: FallbackTable) -> Self {
        self.fallback = table;
        self
    }

    /// Overrides the debounce window.
    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.debounce = window;
        self
    }

    /// Seeds the fallback-selection RNG for deterministic tests.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdMutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Resolves a media URL for `emotion`.
    ///
    /// Cannot terminally fail: the fallback table always yields a URL. The
    /// only path that skips the providers entirely is the debounce
    /// short-circuit, which reuses the previous media untouched. The
    /// debounce is keyed on elapsed time only, not on the emotion: a
    /// different emotion inside the window still gets the previous media.
    pub async fn resolve(&self, emotion: &EmotionLabel, force: bool) -> MediaResult {
        let now = Utc::now();
        {
            let state = self.state.lock().await;
            if !force && state.within_debounce(now, self.debounce) {
                debug!(emotion = %emotion, "debounced, reusing previous media");
                return MediaResult::new(state.last_media_url.clone());
            }
        }

        info!(emotion = %emotion, "resolving media");
        let search_term = self.search_term(emotion).await;

        let mut chosen: Option<MediaResult> = None;
        for source in &self.sources {
            match source.fetch(&search_term).await {
                Ok(Some(media)) => {
                    info!(source = source.name(), url = %media.url, "media source hit");
                    chosen = Some(media);
                    break;
                }
                Ok(None) => {
                    info!(source = source.name(), %search_term, "media source had no result");
                }
                Err(err) => {
                    warn!(source = source.name(), error = %err, "media source failed");
                }
            }
        }

        let media = chosen.unwrap_or_else(|| {
            let url = {
                let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
                self.fallback.pick(emotion, &mut *rng)
            };
            info!(emotion = %emotion, url, "using fallback meme");
            MediaResult::new(url)
        });

        let media = media.cache_busted(now.timestamp());

        let mut state = self.state.lock().await;
        state.last_media_url = media.url.clone();
        state.last_fetched_at = Some(now);
        media
    }

    /// Step 2: refine the search term through the generator if one is
    /// configured. Any failure falls back to the deterministic default term
    /// and is only logged, never propagated.
    async fn search_term(&self, emotion: &EmotionLabel) -> String {
        let default = format!("funny {emotion} meme");
        let Some(generator) = &self.term_generator else {
            return default;
        };
        match generator.suggest(emotion).await {
            Ok(term) if !term.trim().is_empty() => {
                let term = term.trim().to_string();
                info!(%term, "search term suggested");
                term
            }
            Ok(_) => {
                warn!("search term generator returned an empty phrase");
                default
            }
            Err(err) => {
                warn!(error = %err, "search term generator failed");
                default
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::error::ProviderError;

    struct FixedTerm(&'static str);

    #[async_trait]
    impl SearchTermGenerator for FixedTerm {
        async fn suggest(&self, _emotion: &EmotionLabel) -> Result<String, ProviderError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingTerm;

    #[async_trait]
    impl SearchTermGenerator for FailingTerm {
        async fn suggest(&self, _emotion: &EmotionLabel) -> Result<String, ProviderError> {
            Err(ProviderError::Timeout)
        }
    }

    fn cascade() -> MediaResolutionCascade {
        MediaResolutionCascade::new(Arc::new(Mutex::new(SessionState::default()))).with_seed(1)
    }

    #[tokio::test]
    async fn test_search_term_defaults_without_generator() {
        let cascade = cascade();
        let term = cascade.search_term(&EmotionLabel::new("angry")).await;
        assert_eq!(term, "funny angry meme");
    }

    #[tokio::test]
    async fn test_search_term_defaults_on_failure() {
        let cascade = cascade().with_term_generator(Arc::new(FailingTerm));
        let term = cascade.search_term(&EmotionLabel::new("sad")).await;
        assert_eq!(term, "funny sad meme");
    }

    #[tokio::test]
    async fn test_search_term_defaults_on_blank_suggestion() {
        let cascade = cascade().with_term_generator(Arc::new(FixedTerm("   ")));
        let term = cascade.search_term(&EmotionLabel::new("fear")).await;
        assert_eq!(term, "funny fear meme");
    }

    #[tokio::test]
    async fn test_search_term_uses_suggestion() {
        let cascade = cascade().with_term_generator(Arc::new(FixedTerm("grumpy cat monday")));
        let term = cascade.search_term(&EmotionLabel::new("angry")).await;
        assert_eq!(term, "grumpy cat monday");
    }

    struct CountingSource {
        calls: AtomicUsize,
        result: Option<MediaResult>,
    }

    #[async_trait]
    impl MediaSource for CountingSource {
        fn name(&self) -> &str {
            "counting"
        }

        async fn fetch(&self, _term: &str) -> Result<Option<MediaResult>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.result.clone())
        }
    }

    #[tokio::test]
    async fn test_sources_tried_in_order_first_hit_wins() {
        let state = Arc::new(Mutex::new(SessionState::default()));
        let miss = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            result: None,
        });
        let hit = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            result: Some(MediaResult::new("https://hit.example/x.gif")),
        });
        let never = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            result: Some(MediaResult::new("https://never.example/y.gif")),
        });
        let cascade = MediaResolutionCascade::new(state)
            .with_seed(1)
            .with_source(miss.clone())
            .with_source(hit.clone())
            .with_source(never.clone());

        let media = cascade.resolve(&EmotionLabel::new("happy"), true).await;
        assert_eq!(media.base_url(), "https://hit.example/x.gif");
        assert_eq!(miss.calls.load(Ordering::SeqCst), 1);
        assert_eq!(hit.calls.load(Ordering::SeqCst), 1);
        assert_eq!(never.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_sources_fall_back_to_table() {
        let state = Arc::new(Mutex::new(SessionState::default()));
        let miss = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            result: None,
        });
        let cascade = MediaResolutionCascade::new(state)
            .with_seed(1)
            .with_source(miss);

        let sad = EmotionLabel::new("sad");
        let media = cascade.resolve(&sad, true).await;
        assert!(!media.url.is_empty());
        let table = FallbackTable::default();
        assert!(table.pool(&sad).iter().any(|u| *u == media.base_url()));
    }

    #[tokio::test]
    async fn test_unknown_emotion_resolves_through_default_pool() {
        let cascade = cascade();
        let media = cascade.resolve(&EmotionLabel::new("perplexed"), true).await;
        let table = FallbackTable::default();
        assert!(
            table
                .pool(&EmotionLabel::neutral())
                .iter()
                .any(|u| *u == media.base_url())
        );
    }
}
