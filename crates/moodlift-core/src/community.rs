//! Community-sourced meme resolution.
//!
//! A separate cascade from the main one: maps an emotion to a primary and a
//! fallback community, pulls each community's weekly top posts through a
//! [`CommunityFeed`], filters to still-image posts, and picks one at random.
//! Unlike the main cascade this one can come up empty, which the caller
//! reports as a structured "no result" payload.

use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{info, warn};

use crate::emotion::EmotionLabel;
use crate::media::MediaResult;
use crate::provider::{CommunityFeed, CommunityPost};

/// File extensions accepted as direct image links.
const IMAGE_EXTENSIONS: [&str; 4] = [".jpg", ".png", ".gif", ".jpeg"];

/// Image host whose bare links count as images even without an extension.
const IMAGE_HOST: &str = "i.redd.it";

/// Primary and fallback community for one emotion bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommunityRoute {
    pub primary: &'static str,
    pub fallback: &'static str,
}

/// Maps an emotion to its community pair.
pub fn route_for(emotion: &EmotionLabel) -> CommunityRoute {
    match emotion.as_str() {
        "sad" | "fear" | "disgust" => CommunityRoute {
            primary: "wholesomememes",
            fallback: "aww",
        },
        "angry" => CommunityRoute {
            primary: "satisfying",
            fallback: "oddlysatisfying",
        },
        "happy" | "surprise" => CommunityRoute {
            primary: "CryptoCurrencyMemes",
            fallback: "motivation",
        },
        _ => CommunityRoute {
            primary: "programmerhumor",
            fallback: "technology",
        },
    }
}

/// Whether a post is a usable still image.
///
/// Direct image extension, an explicit image hint, or a bare link on the
/// known image host. `.gifv` is an animated-video container and is excluded
/// even on the image host.
pub fn is_image_post(post: &CommunityPost) -> bool {
    if post.url.ends_with(".gifv") {
        return false;
    }
    IMAGE_EXTENSIONS.iter().any(|ext| post.url.ends_with(ext))
        || post.post_hint.as_deref() == Some("image")
        || post.domain.as_deref() == Some(IMAGE_HOST)
}

/// Resolves memes from community feeds.
pub struct CommunityMemeResolver {
    feed: Arc<dyn CommunityFeed>,
    rng: StdMutex<StdRng>,
}

impl CommunityMemeResolver {
    pub fn new(feed: Arc<dyn CommunityFeed>) -> Self {
        Self {
            feed,
            rng: StdMutex::new(StdRng::from_entropy()),
        }
    }

    /// Seeds the post-selection RNG for deterministic tests.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdMutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Tries the primary community, then the fallback. A feed error counts
    /// the same as zero qualifying posts. `None` means both communities
    /// exhausted without a usable image.
    pub async fn resolve(&self, emotion: &EmotionLabel) -> Option<MediaResult> {
        let route = route_for(emotion);
        info!(emotion = %emotion, community = route.primary, "fetching community memes");

        for community in [route.primary, route.fallback] {
            match self.feed.top_posts(community).await {
                Ok(posts) => {
                    let images: Vec<CommunityPost> =
                        posts.into_iter().filter(is_image_post).collect();
                    if images.is_empty() {
                        info!(community, "no qualifying image posts");
                        continue;
                    }
                    let post = {
                        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
                        images.choose(&mut *rng).cloned()
                    };
                    if let Some(post) = post {
                        info!(community, title = %post.title, "selected community post");
                        return Some(
                            MediaResult::new(post.url)
                                .with_source(format!("r/{community}"))
                                .with_title(post.title),
                        );
                    }
                }
                Err(err) => {
                    warn!(community, error = %err, "community feed failed");
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;
    use crate::error::ProviderError;

    #[test]
    fn test_route_buckets() {
        for tag in ["sad", "fear", "disgust"] {
            assert_eq!(
                route_for(&EmotionLabel::new(tag)).primary,
                "wholesomememes"
            );
        }
        let angry = route_for(&EmotionLabel::new("angry"));
        assert_eq!(angry.primary, "satisfying");
        assert_eq!(angry.fallback, "oddlysatisfying");
        assert_eq!(
            route_for(&EmotionLabel::new("surprise")).fallback,
            "motivation"
        );
        let unknown = route_for(&EmotionLabel::new("bored"));
        assert_eq!(unknown.primary, "programmerhumor");
        assert_eq!(unknown.fallback, "technology");
    }

    #[test]
    fn test_image_filter_extensions_and_hint() {
        assert!(is_image_post(&CommunityPost::new(
            "https://x.example/a.jpg",
            "t"
        )));
        assert!(is_image_post(
            &CommunityPost::new("https://x.example/post/123", "t").with_hint("image")
        ));
        assert!(!is_image_post(&CommunityPost::new(
            "https://v.example/clip.mp4",
            "t"
        )));
    }

    #[test]
    fn test_image_filter_excludes_gifv_on_image_host() {
        let post = CommunityPost::new("https://i.redd.it/abc.gifv", "t").with_domain("i.redd.it");
        assert!(!is_image_post(&post));

        let still = CommunityPost::new("https://i.redd.it/abc", "t").with_domain("i.redd.it");
        assert!(is_image_post(&still));
    }

    struct MapFeed {
        posts: HashMap<&'static str, Vec<CommunityPost>>,
    }

    #[async_trait]
    impl CommunityFeed for MapFeed {
        async fn top_posts(&self, community: &str) -> Result<Vec<CommunityPost>, ProviderError> {
            match self.posts.get(community) {
                Some(posts) => Ok(posts.clone()),
                None => Err(ProviderError::status(404, "no such community")),
            }
        }
    }

    #[tokio::test]
    async fn test_falls_back_when_primary_is_empty() {
        let feed = MapFeed {
            posts: HashMap::from([
                ("satisfying", vec![]),
                (
                    "oddlysatisfying",
                    vec![CommunityPost::new("https://i.redd.it/ok.jpg", "smooth")
                        .with_domain("i.redd.it")],
                ),
            ]),
        };
        let resolver = CommunityMemeResolver::new(Arc::new(feed)).with_seed(3);
        let media = resolver.resolve(&EmotionLabel::new("angry")).await.unwrap();
        assert_eq!(media.url, "https://i.redd.it/ok.jpg");
        assert_eq!(media.source.as_deref(), Some("r/oddlysatisfying"));
        assert_eq!(media.title.as_deref(), Some("smooth"));
    }

    #[tokio::test]
    async fn test_gifv_only_primary_advances_to_fallback() {
        let feed = MapFeed {
            posts: HashMap::from([
                (
                    "satisfying",
                    vec![CommunityPost::new("https://i.redd.it/a.gifv", "loop")
                        .with_domain("i.redd.it")],
                ),
                (
                    "oddlysatisfying",
                    vec![CommunityPost::new("https://i.redd.it/b.png", "press")
                        .with_domain("i.redd.it")],
                ),
            ]),
        };
        let resolver = CommunityMemeResolver::new(Arc::new(feed)).with_seed(3);
        let media = resolver.resolve(&EmotionLabel::new("angry")).await.unwrap();
        assert_eq!(media.url, "https://i.redd.it/b.png");
    }

    #[tokio::test]
    async fn test_both_communities_exhausted_returns_none() {
        let feed = MapFeed {
            posts: HashMap::new(),
        };
        let resolver = CommunityMemeResolver::new(Arc::new(feed)).with_seed(3);
        assert!(resolver.resolve(&EmotionLabel::new("angry")).await.is_none());
    }

    #[tokio::test]
    async fn test_feed_error_counts_as_empty() {
        let feed = MapFeed {
            posts: HashMap::from([(
                "technology",
                vec![CommunityPost::new("https://x.example/chip.jpeg", "fab")],
            )]),
        };
        let resolver = CommunityMemeResolver::new(Arc::new(feed)).with_seed(3);
        // "bored" routes to programmerhumor (errors) then technology.
        let media = resolver.resolve(&EmotionLabel::new("bored")).await.unwrap();
        assert_eq!(media.url, "https://x.example/chip.jpeg");
    }
}
