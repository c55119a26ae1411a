//! RedditFeed - weekly top-post listings for the community meme resolver.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use moodlift_core::error::ProviderError;
use moodlift_core::provider::{CommunityFeed, CommunityPost};

// Reddit rejects default library User-Agents; a browser-like one works.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                          AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const POST_LIMIT: u32 = 100;
const TIMEOUT: Duration = Duration::from_secs(10);

/// Client for Reddit's public listing JSON.
#[derive(Clone, Default)]
pub struct RedditFeed {
    client: Client,
}

impl RedditFeed {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommunityFeed for RedditFeed {
    async fn top_posts(&self, community: &str) -> Result<Vec<CommunityPost>, ProviderError> {
        let url = format!(
            "https://www.reddit.com/r/{community}/top.json?limit={POST_LIMIT}&t=week"
        );
        debug!(%url, "requesting community listing");

        let response = self
            .client
            .get(&url)
            .timeout(TIMEOUT)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::status(status, body));
        }

        let listing: Listing = response
            .json()
            .await
            .map_err(|err| ProviderError::malformed(format!("Reddit listing: {err}")))?;
        Ok(listing.into_posts())
    }
}

#[derive(Deserialize)]
struct Listing {
    #[serde(default)]
    data: ListingData,
}

#[derive(Deserialize, Default)]
struct ListingData {
    #[serde(default)]
    children: Vec<PostWrapper>,
}

#[derive(Deserialize)]
struct PostWrapper {
    data: PostEntry,
}

#[derive(Deserialize)]
struct PostEntry {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    post_hint: Option<String>,
    #[serde(default)]
    domain: Option<String>,
}

impl Listing {
    fn into_posts(self) -> Vec<CommunityPost> {
        self.data
            .children
            .into_iter()
            .filter_map(|wrapper| {
                let entry = wrapper.data;
                let url = entry.url?;
                Some(CommunityPost {
                    url,
                    title: entry.title.unwrap_or_default(),
                    post_hint: entry.post_hint,
                    domain: entry.domain,
                })
            })
            .collect()
    }
}
