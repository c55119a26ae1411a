//! GiphyClient - random GIF lookup used as the primary media source.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use moodlift_core::error::ProviderError;
use moodlift_core::media::MediaResult;
use moodlift_core::provider::MediaSource;

const RANDOM_URL: &str = "https://api.giphy.com/v1/gifs/random";
const RATING: &str = "pg-13";
const TIMEOUT: Duration = Duration::from_secs(5);

/// Client for Giphy's random-GIF endpoint.
#[derive(Clone)]
pub struct GiphyClient {
    client: Client,
    api_key: String,
}

impl GiphyClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
        }
    }

    async fn random(&self, tag: &str) -> Result<Option<String>, ProviderError> {
        debug!(%tag, "querying giphy");
        let response = self
            .client
            .get(RANDOM_URL)
            .timeout(TIMEOUT)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("tag", tag),
                ("rating", RATING),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::status(status, body));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|err| ProviderError::malformed(format!("Giphy response: {err}")))?;
        Ok(extract_original_url(&payload))
    }
}

#[async_trait]
impl MediaSource for GiphyClient {
    fn name(&self) -> &str {
        "giphy"
    }

    async fn fetch(&self, search_term: &str) -> Result<Option<MediaResult>, ProviderError> {
        let url = self.random(search_term).await?;
        Ok(url.map(|u| MediaResult::new(u).with_source("giphy")))
    }
}

/// Pulls `data.images.original.url` out of a random-GIF response.
///
/// Giphy reports "no result" as an empty `data` array, which probes to
/// `None` the same way a missing field does.
fn extract_original_url(payload: &Value) -> Option<String> {
    payload
        .get("data")?
        .get("images")?
        .get("original")?
        .get("url")?
        .as_str()
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_url_from_hit() {
        let payload: Value = serde_json::from_str(
            r#"{"data": {"images": {"original": {"url": "https://media.giphy.com/x.gif"}}}}"#,
        )
        .unwrap();
        assert_eq!(
            extract_original_url(&payload).as_deref(),
            Some("https://media.giphy.com/x.gif")
        );
    }

    #[test]
    fn test_extract_url_from_empty_data_array() {
        let payload: Value = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(extract_original_url(&payload).is_none());
    }

    #[test]
    fn test_extract_url_from_missing_data() {
        let payload: Value = serde_json::from_str(r#"{"meta": {"status": 200}}"#).unwrap();
        assert!(extract_original_url(&payload).is_none());
    }
}
