//! GeminiClient - direct REST implementation for the Gemini API.
//!
//! One client covers every Gemini use in the backend: search-term
//! generation for the meme cascade, emotion classification over a captured
//! frame, audio transcription, and the life-insight analysis. Media is sent
//! inline (base64) in the `generateContent` request.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use moodlift_core::emotion::EmotionLabel;
use moodlift_core::error::ProviderError;
use moodlift_core::provider::SearchTermGenerator;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Search-term refinement stays snappy; the cascade falls back on timeout.
const SEARCH_TERM_TIMEOUT: Duration = Duration::from_secs(5);
const CLASSIFY_TIMEOUT: Duration = Duration::from_secs(10);
const ANALYSIS_TIMEOUT: Duration = Duration::from_secs(30);
const TRANSCRIBE_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for the Gemini `generateContent` REST API.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Creates a client with the provided API key and the default model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sends a text-only prompt and returns the first candidate's text.
    pub async fn generate_text(
        &self,
        prompt: &str,
        timeout: Duration,
    ) -> Result<String, ProviderError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part::Text {
                    text: prompt.to_string(),
                }],
            }],
        };
        self.send(&request, timeout).await
    }

    /// Sends a prompt alongside inline media (image or audio bytes).
    pub async fn generate_with_media(
        &self,
        prompt: &str,
        mime_type: &str,
        bytes: &[u8],
        timeout: Duration,
    ) -> Result<String, ProviderError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![
                    Part::Text {
                        text: prompt.to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineDataPayload {
                            mime_type: mime_type.to_string(),
                            data: BASE64_STANDARD.encode(bytes),
                        },
                    },
                ],
            }],
        };
        self.send(&request, timeout).await
    }

    /// Classifies a captured frame into the closed emotion set.
    ///
    /// Off-script replies normalize to `neutral` rather than erroring: the
    /// classifier's job is a best-effort label, not a contract.
    pub async fn classify_emotion(
        &self,
        mime_type: &str,
        frame: &[u8],
    ) -> Result<EmotionLabel, ProviderError> {
        let prompt = "Look at the person's facial expression in this image. Answer with \
                      exactly one lowercase word from this list and nothing else: \
                      happy, sad, angry, fear, neutral, surprise, disgust.";
        let reply = self
            .generate_with_media(prompt, mime_type, frame, CLASSIFY_TIMEOUT)
            .await?;
        let label = EmotionLabel::new(reply);
        if label.is_known() {
            Ok(label)
        } else {
            debug!(reply = %label, "classifier reply outside label set, using neutral");
            Ok(EmotionLabel::neutral())
        }
    }

    /// Transcribes uploaded audio exactly.
    pub async fn transcribe(
        &self,
        mime_type: &str,
        audio: &[u8],
    ) -> Result<String, ProviderError> {
        let prompt =
            "Transcribe this audio exactly. Return ONLY the transcription text, no preamble.";
        let text = self
            .generate_with_media(prompt, mime_type, audio, TRANSCRIBE_TIMEOUT)
            .await?;
        Ok(text.trim().to_string())
    }

    /// Cross-references journal, finance and habit data for correlations.
    /// Returns the model's JSON-ish reply with any code fences stripped.
    pub async fn analyze_life(
        &self,
        journal_entries: &[Value],
        finance_data: &[Value],
        habit_data: &[Value],
    ) -> Result<String, ProviderError> {
        let prompt = format!(
            "You are an advanced AI Life Coach. Analyze the following user data to find \
             hidden correlations between their Mood, Finances, and Habits.\n\
             \n\
             DATA:\n\
             - Recent Journal/Moods: {journal}\n\
             - Recent Spending: {finance}\n\
             - Recent Habits: {habits}\n\
             \n\
             TASK:\n\
             1. Identify 3 specific patterns/correlations (e.g., \"You spend more on food \
             when you are anxious\").\n\
             2. Provide 1 concrete, actionable recommendation.\n\
             \n\
             OUTPUT FORMAT (JSON):\n\
             {{\n\
                 \"insights\": [\"Insight 1\", \"Insight 2\", \"Insight 3\"],\n\
                 \"recommendation\": \"Actionable advice\"\n\
             }}\n\
             Return ONLY valid JSON. Do not use Markdown formatting.",
            journal = Value::from(journal_entries.to_vec()),
            finance = Value::from(finance_data.to_vec()),
            habits = Value::from(habit_data.to_vec()),
        );
        let text = self.generate_text(&prompt, ANALYSIS_TIMEOUT).await?;
        Ok(strip_code_fences(&text).to_string())
    }

    async fn send(
        &self,
        request: &GenerateContentRequest,
        timeout: Duration,
    ) -> Result<String, ProviderError> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            BASE_URL,
            model = self.model,
            api_key = self.api_key
        );

        let response = self
            .client
            .post(url)
            .timeout(timeout)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read Gemini error body".to_string());
            return Err(ProviderError::status(status, extract_error_message(&body)));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| ProviderError::malformed(format!("Gemini response: {err}")))?;

        extract_text(parsed)
    }
}

#[async_trait]
impl SearchTermGenerator for GeminiClient {
    async fn suggest(&self, emotion: &EmotionLabel) -> Result<String, ProviderError> {
        let prompt = format!(
            "Generate a single, funny, specific search query for a GIF to cheer up someone \
             who looks '{emotion}'. Return ONLY the search term, no quotes."
        );
        let term = self.generate_text(&prompt, SEARCH_TERM_TIMEOUT).await?;
        Ok(term.trim().to_string())
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

fn extract_text(response: GenerateContentResponse) -> Result<String, ProviderError> {
    response
        .candidates
        .and_then(|mut candidates| candidates.pop())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .ok_or_else(|| ProviderError::malformed("Gemini returned no text candidates"))
}

fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(|err| err.get("message"))
                .and_then(|msg| msg.as_str())
                .map(|msg| msg.to_string())
        })
        .unwrap_or_else(|| body.to_string())
}

/// Strips a leading/trailing Markdown code fence from a model reply.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_from_candidate_payload() {
        let json = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "grumpy cat monday"}]}
            }]
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(extract_text(parsed).unwrap(), "grumpy cat monday");
    }

    #[test]
    fn test_extract_text_empty_candidates_is_malformed() {
        let parsed: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(matches!(
            extract_text(parsed),
            Err(ProviderError::Malformed(_))
        ));
    }

    #[test]
    fn test_extract_error_message() {
        let body = r#"{"error": {"code": 429, "message": "quota exceeded"}}"#;
        assert_eq!(extract_error_message(body), "quota exceeded");
        assert_eq!(extract_error_message("plain text"), "plain text");
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(
            strip_code_fences("```json\n{\"a\": 1}\n```"),
            "{\"a\": 1}"
        );
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn test_inline_data_request_shape() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part::InlineData {
                    inline_data: InlineDataPayload {
                        mime_type: "image/jpeg".to_string(),
                        data: "QUJD".to_string(),
                    },
                }],
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json["contents"][0]["parts"][0]["inlineData"]["mimeType"],
            "image/jpeg"
        );
    }
}
