//! HTTP surface.
//!
//! Every endpoint answers JSON. Expected failures (missing key, provider
//! error, no qualifying meme, capture failure) come back as structured
//! `{"error": ...}` bodies with a 200 status, matching the frontend's
//! polling contract; protocol-level errors are reserved for the framework.

use axum::extract::{Multipart, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use moodlift_core::EmotionLabel;

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/status", get(status))
        .route("/analyze_mood", post(analyze_mood))
        .route("/fetch_meme_reddit", get(fetch_meme_reddit))
        .route("/analyze_life", post(analyze_life))
        .route("/transcribe", post(transcribe))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn error_json(message: impl std::fmt::Display) -> Json<Value> {
    Json(json!({ "error": message.to_string() }))
}

async fn root() -> Json<Value> {
    Json(json!({ "status": "Moodlift backend running" }))
}

/// Snapshot of the session state for the polling frontend.
async fn status(State(app): State<AppState>) -> Json<Value> {
    let session = app.session.lock().await;
    Json(json!(session.snapshot()))
}

/// Captures a frame, classifies the emotion and force-resolves a meme.
async fn analyze_mood(State(app): State<AppState>) -> Json<Value> {
    info!("manual mood scan requested");
    let Some(source) = &app.emotion_source else {
        return error_json("Gemini API key not configured; mood analysis unavailable");
    };

    let emotion = match source.detect().await {
        Ok(emotion) => emotion,
        Err(err) => {
            warn!(error = %err, "mood analysis failed");
            return error_json(err);
        }
    };

    {
        let mut session = app.session.lock().await;
        session.last_emotion = emotion.clone();
    }

    let media = app.cascade.resolve(&emotion, true).await;
    Json(json!({ "emotion": emotion, "meme_url": media.url }))
}

#[derive(Deserialize)]
struct MemeQuery {
    emotion: String,
}

/// Community-sourced meme cascade; fetched server-side to sidestep CORS.
async fn fetch_meme_reddit(
    State(app): State<AppState>,
    Query(query): Query<MemeQuery>,
) -> Json<Value> {
    let emotion = EmotionLabel::new(query.emotion);
    match app.community.resolve(&emotion).await {
        Some(media) => Json(json!(media)),
        None => error_json(format!(
            "no image posts found for '{emotion}' in either community"
        )),
    }
}

#[derive(Deserialize)]
struct LifeData {
    #[serde(default)]
    journal_entries: Vec<Value>,
    #[serde(default)]
    finance_data: Vec<Value>,
    #[serde(default)]
    habit_data: Vec<Value>,
}

/// Cross-references journal, finance and habit data via the LLM.
async fn analyze_life(State(app): State<AppState>, Json(data): Json<LifeData>) -> Json<Value> {
    let Some(gemini) = &app.gemini else {
        return error_json("Gemini API key not configured");
    };
    info!("life analysis requested");
    match gemini
        .analyze_life(&data.journal_entries, &data.finance_data, &data.habit_data)
        .await
    {
        Ok(analysis) => Json(json!({ "analysis": analysis })),
        Err(err) => {
            warn!(error = %err, "life analysis failed");
            error_json(err)
        }
    }
}

/// Transcribes an uploaded audio file via the LLM.
async fn transcribe(State(app): State<AppState>, mut multipart: Multipart) -> Json<Value> {
    let Some(gemini) = &app.gemini else {
        return error_json("Gemini API key not configured");
    };

    let mut audio: Option<(String, Vec<u8>)> = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() == Some("file") {
                    let mime = field
                        .content_type()
                        .unwrap_or("audio/webm")
                        .to_string();
                    match field.bytes().await {
                        Ok(bytes) => audio = Some((mime, bytes.to_vec())),
                        Err(err) => return error_json(format!("failed to read upload: {err}")),
                    }
                }
            }
            Ok(None) => break,
            Err(err) => return error_json(format!("multipart error: {err}")),
        }
    }

    let Some((mime, bytes)) = audio else {
        return error_json("missing 'file' field in upload");
    };
    if bytes.is_empty() {
        return error_json("uploaded audio is empty");
    }
    info!(%mime, size = bytes.len(), "transcription requested");

    match gemini.transcribe(&mime, &bytes).await {
        Ok(transcription) => Json(json!({ "transcription": transcription })),
        Err(err) => {
            warn!(error = %err, "transcription failed");
            error_json(err)
        }
    }
}
