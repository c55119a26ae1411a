//! Provider ports.
//!
//! Every external collaborator sits behind one of these object-safe traits,
//! so the cascade treats provider calls as an ordered list of strategies
//! with a uniform attempt/outcome contract and tests can inject fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::emotion::EmotionLabel;
use crate::error::ProviderError;
use crate::media::MediaResult;

/// Turns an emotion into a refined media search phrase.
#[async_trait]
pub trait SearchTermGenerator: Send + Sync {
    async fn suggest(&self, emotion: &EmotionLabel) -> Result<String, ProviderError>;
}

/// A media lookup strategy tried in cascade order.
///
/// `Ok(None)` means the provider responded but had nothing usable, which
/// advances the cascade just like an error does.
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    async fn fetch(&self, search_term: &str) -> Result<Option<MediaResult>, ProviderError>;
}

/// Fetches the recent top posts of a community (e.g. a subreddit).
#[async_trait]
pub trait CommunityFeed: Send + Sync {
    async fn top_posts(&self, community: &str) -> Result<Vec<CommunityPost>, ProviderError>;
}

/// Produces a single emotion label from whatever the implementation
/// observes (a webcam frame, in the default wiring).
#[async_trait]
pub trait EmotionSource: Send + Sync {
    async fn detect(&self) -> Result<EmotionLabel, ProviderError>;
}

/// One post as reported by a community feed, before image filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityPost {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub post_hint: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
}

impl CommunityPost {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            post_hint: None,
            domain: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.post_hint = Some(hint.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }
}
