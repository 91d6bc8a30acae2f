//! Diagnostic handlers.
//!
//! Endpoints:
//! - GET /scenes - The scene script loaded at startup
//! - GET /debug  - Non-secret configuration echo

use axum::Json;
use axum::extract::State;
use serde_json::json;

use crate::state::AppState;

/// GET /scenes - Hand the scene script to the web UI.
pub async fn get_scenes(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json((*state.scenes).clone())
}

/// GET /debug - Echo non-secret configuration for on-stage triage.
pub async fn get_debug(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "introMp3Url": state.intro_mp3_url.as_deref().unwrap_or("(not set)"),
        "publicBaseUrl": if state.public_base_url.is_empty() {
            "(not set)"
        } else {
            state.public_base_url.as_str()
        },
    }))
}
