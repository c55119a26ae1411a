//! Outbound API clients for the Moodlift backend.
//!
//! Each client implements the matching port trait from `moodlift-core`, so
//! the cascades never see a concrete provider. All calls carry fixed
//! timeouts and no retries; a failed call is a `ProviderError` value the
//! caller absorbs.

pub mod gemini;
pub mod giphy;
pub mod reddit;

pub use gemini::GeminiClient;
pub use giphy::GiphyClient;
pub use reddit::RedditFeed;
