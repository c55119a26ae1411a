//! Domain model and media resolution logic for the Moodlift backend.
//!
//! The crate is provider-agnostic: external collaborators (LLM, GIF search,
//! community feeds, the emotion classifier) are traits in [`provider`], and
//! the cascades in [`cascade`] and [`community`] only consume those traits.

pub mod cascade;
pub mod community;
pub mod emotion;
pub mod error;
pub mod fallback;
pub mod media;
pub mod provider;
pub mod state;

pub use cascade::MediaResolutionCascade;
pub use community::CommunityMemeResolver;
pub use emotion::EmotionLabel;
pub use error::{MoodliftError, ProviderError, Result};
pub use fallback::FallbackTable;
pub use media::MediaResult;
pub use state::SessionState;
