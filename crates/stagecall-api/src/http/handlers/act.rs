//! Web performance handlers.
//!
//! Endpoints:
//! - POST /web-act - Full utterance -> reply -> audio pipeline
//! - POST /web-tts - Synthesis only, for scripted lines

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::http::error::AppError;
use crate::state::AppState;

/// Cap on audience input; anything longer is stage noise.
const INPUT_MAX_CHARS: usize = 1000;

/// Session used when the browser does not send one.
const DEFAULT_SESSION: &str = "dev";

#[derive(Debug, Deserialize)]
pub struct ActRequest {
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub text: String,
    /// Persona override for this turn; empty means the default persona.
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ActResponse {
    pub reply: String,
    #[serde(rename = "audioUrl")]
    pub audio_url: String,
}

/// POST /web-act - Run the full pipeline for one audience utterance.
pub async fn web_act(
    State(state): State<AppState>,
    Json(request): Json<ActRequest>,
) -> Result<Json<ActResponse>, AppError> {
    let session_id = request
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SESSION.to_string());
    let text = truncate_chars(&request.text, INPUT_MAX_CHARS);

    let line = state
        .engine
        .respond(&session_id, text, request.prompt.as_deref())
        .await?;

    Ok(Json(ActResponse {
        reply: line.reply,
        audio_url: line.audio_url,
    }))
}

#[derive(Debug, Deserialize)]
pub struct TtsRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct TtsResponse {
    #[serde(rename = "audioUrl")]
    pub audio_url: String,
}

/// POST /web-tts - Synthesize a scripted line without touching memory.
pub async fn web_tts(
    State(state): State<AppState>,
    Json(request): Json<TtsRequest>,
) -> Result<Json<TtsResponse>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text is required".to_string()));
    }

    let speech = state.engine.synthesize_speech(&request.text).await?;
    Ok(Json(TtsResponse { audio_url: speech.url }))
}

/// Cut at a character boundary, never a byte offset.
fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("håll kvar", 4), "håll");
        assert_eq!(truncate_chars("kort", 1000), "kort");
    }

    #[test]
    fn test_act_request_defaults() {
        let request: ActRequest = serde_json::from_str(r#"{"text": "hej"}"#).unwrap();
        assert!(request.session_id.is_none());
        assert_eq!(request.text, "hej");
        assert!(request.prompt.is_none());
    }

    #[test]
    fn test_act_response_uses_camel_case_url() {
        let response = ActResponse {
            reply: "Okej.".to_string(),
            audio_url: "/tts/abc".to_string(),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["audioUrl"], "/tts/abc");
    }
}
