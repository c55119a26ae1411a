//! Media result value type.

use serde::{Deserialize, Serialize};

/// A resolved piece of media.
///
/// Immutable once constructed; every resolution produces a fresh value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaResult {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl MediaResult {
    /// Creates a result carrying only a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            source: None,
            title: None,
        }
    }

    /// Attaches the provider/community the media came from.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attaches the media's title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Returns a new result whose URL carries a `t={timestamp}` query
    /// parameter, so a polling frontend sees a fresh URL on every
    /// resolution even when the underlying media repeats.
    pub fn cache_busted(self, timestamp: i64) -> Self {
        let separator = if self.url.contains('?') { '&' } else { '?' };
        Self {
            url: format!("{}{}t={}", self.url, separator, timestamp),
            ..self
        }
    }

    /// The URL with any `t=` cache-busting suffix stripped.
    pub fn base_url(&self) -> &str {
        match self.url.rfind(|c| c == '?' || c == '&') {
            Some(idx) if self.url[idx + 1..].starts_with("t=") => &self.url[..idx],
            _ => &self.url,
        }
    }
}
