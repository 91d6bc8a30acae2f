//! Audio serving handlers.
//!
//! Endpoints:
//! - GET /tts/{id}  - Serve cached synthesis output by handle
//! - GET /audio?u=  - Same-origin proxy for external audio URLs

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use stagecall_types::speech::AudioHandle;

use crate::http::error::AppError;
use crate::state::AppState;

/// GET /tts/{id} - Serve one cached audio payload.
///
/// Malformed handles get the same 404 as unknown ones; the difference
/// is not actionable for the client.
pub async fn get_tts(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let handle: AudioHandle = id
        .parse()
        .map_err(|_| AppError::NotFound("audio not found".to_string()))?;
    let audio = state
        .engine
        .audio_fetch(&handle)
        .ok_or_else(|| AppError::NotFound("audio not found".to_string()))?;

    Ok((
        [(header::CONTENT_TYPE, audio.content_type.clone())],
        audio.bytes.clone(),
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct ProxyQuery {
    #[serde(default)]
    pub u: Option<String>,
}

/// GET /audio?u= - Relay external audio through this origin.
///
/// Browsers on stage tablets are picky about cross-origin audio, so
/// every clip plays through the show's own domain.
pub async fn proxy_audio(
    State(state): State<AppState>,
    Query(query): Query<ProxyQuery>,
) -> Result<Response, AppError> {
    let url = query
        .u
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| AppError::Validation("query parameter 'u' is required".to_string()))?;

    let upstream = state
        .proxy_client
        .get(&url)
        .send()
        .await
        .map_err(|e| AppError::BadGateway(e.to_string()))?;

    let status = upstream.status();
    if !status.is_success() {
        return Err(AppError::BadGateway(format!(
            "upstream returned {status}"
        )));
    }

    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("audio/mpeg")
        .to_string();
    let bytes = upstream
        .bytes()
        .await
        .map_err(|e| AppError::BadGateway(e.to_string()))?;

    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}
