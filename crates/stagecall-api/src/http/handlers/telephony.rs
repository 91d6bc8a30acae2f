//! Twilio voice webhook handlers.
//!
//! Endpoints:
//! - POST /voice     - Call entry point, returns the opening TwiML
//! - POST /voice/act - Speech result webhook, returns the reply TwiML
//!
//! Twilio submits webhooks as form data and expects `text/xml` TwiML
//! back. Sessions are keyed by call SID, so each caller gets their own
//! conversation thread.

use axum::Form;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::http::error::AppError;
use crate::state::AppState;

/// Spoken while the gather waits for the caller.
const GATHER_PROMPT: &str = "När musiken tystnar, tala fritt.";

/// Session key when Twilio omits the call SID.
const DEFAULT_CALL_SESSION: &str = "call";

/// POST /voice - Answer an incoming call.
///
/// Plays the intro clip when one is configured, then gathers speech
/// and posts the transcript to `/voice/act`.
pub async fn voice(State(state): State<AppState>) -> Response {
    let mut twiml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response>");
    if let Some(intro) = &state.intro_mp3_url {
        twiml.push_str("<Play>");
        twiml.push_str(&xml_escape(intro));
        twiml.push_str("</Play>");
    }
    twiml.push_str(
        "<Gather input=\"speech\" action=\"/voice/act\" method=\"POST\" speechTimeout=\"auto\">",
    );
    twiml.push_str("<Say language=\"sv-SE\" voice=\"Polly.Mattias\">");
    twiml.push_str(&xml_escape(GATHER_PROMPT));
    twiml.push_str("</Say></Gather></Response>");

    xml_response(twiml)
}

#[derive(Debug, Deserialize)]
pub struct VoiceActForm {
    #[serde(rename = "CallSid", default)]
    pub call_sid: Option<String>,
    #[serde(rename = "SpeechResult", default)]
    pub speech_result: Option<String>,
}

/// POST /voice/act - Respond to one gathered utterance.
pub async fn voice_act(
    State(state): State<AppState>,
    Form(form): Form<VoiceActForm>,
) -> Result<Response, AppError> {
    let session_id = form
        .call_sid
        .filter(|sid| !sid.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CALL_SESSION.to_string());
    let utterance = form.speech_result.unwrap_or_default();

    let line = state.engine.respond(&session_id, &utterance, None).await?;

    let twiml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Play>{}</Play><Hangup/></Response>",
        xml_escape(&line.audio_url)
    );
    Ok(xml_response(twiml))
}

fn xml_response(twiml: String) -> Response {
    ([(header::CONTENT_TYPE, "text/xml")], twiml).into_response()
}

/// Escape text for embedding in TwiML element content.
fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
