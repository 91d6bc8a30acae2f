//! Speech synthesis types: audio handles, synthesized payloads,
//! provider preference, and the provider-level error classification
//! that drives the primary/secondary fallback policy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier referencing one cached audio payload.
///
/// Minted fresh (UUID v7) for every synthesis call; never reused or
/// overwritten within a process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AudioHandle(Uuid);

impl AudioHandle {
    /// Mint a new, globally unique handle.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for AudioHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AudioHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for AudioHandle {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// One synthesized audio payload. Created once, never mutated.
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    pub handle: AudioHandle,
    /// MIME type of the payload (providers return `audio/mpeg`).
    pub content_type: String,
    /// Raw provider bytes, stored byte-for-byte without re-encoding.
    pub bytes: Vec<u8>,
}

/// Which speech provider to try first.
///
/// An explicit enumerated configuration value: unrecognized selections
/// are rejected at startup rather than silently defaulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeechPreference {
    /// ElevenLabs first, OpenAI as fallback (the default).
    ElevenLabs,
    /// OpenAI first, ElevenLabs as fallback.
    OpenAi,
}

impl Default for SpeechPreference {
    fn default() -> Self {
        SpeechPreference::ElevenLabs
    }
}

impl fmt::Display for SpeechPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeechPreference::ElevenLabs => write!(f, "elevenlabs"),
            SpeechPreference::OpenAi => write!(f, "openai"),
        }
    }
}

impl FromStr for SpeechPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "elevenlabs" => Ok(SpeechPreference::ElevenLabs),
            "openai" => Ok(SpeechPreference::OpenAi),
            other => Err(format!("invalid speech provider preference: '{other}'")),
        }
    }
}

/// Errors from a single speech provider call.
///
/// The variant determines the router's fallback decision: credentials
/// and auth/rate-limit/transport failures fall back to the secondary
/// provider; any other non-success status is terminal.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SpeechError {
    #[error("provider credentials are not configured")]
    NotConfigured,

    #[error("authorization rejected (HTTP {0})")]
    Denied(u16),

    #[error("rate limited (HTTP 429)")]
    RateLimited,

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
}

impl SpeechError {
    /// Classify a non-success HTTP status from a provider.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => SpeechError::Denied(status),
            429 => SpeechError::RateLimited,
            _ => SpeechError::Status { status, message },
        }
    }

    /// Whether this failure should trigger the secondary provider.
    ///
    /// `allow_server_errors` extends the trigger set to 5xx statuses
    /// (configuration flag; off by default).
    pub fn triggers_fallback(&self, allow_server_errors: bool) -> bool {
        match self {
            SpeechError::NotConfigured => true,
            SpeechError::Denied(_) => true,
            SpeechError::RateLimited => true,
            SpeechError::Transport(_) => true,
            SpeechError::Status { status, .. } => allow_server_errors && *status >= 500,
        }
    }

    /// The HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            SpeechError::Denied(status) => Some(*status),
            SpeechError::RateLimited => Some(429),
            SpeechError::Status { status, .. } => Some(*status),
            SpeechError::NotConfigured | SpeechError::Transport(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_uniqueness() {
        let a = AudioHandle::new();
        let b = AudioHandle::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_handle_display_parse_roundtrip() {
        let handle = AudioHandle::new();
        let parsed: AudioHandle = handle.to_string().parse().unwrap();
        assert_eq!(handle, parsed);
    }

    #[test]
    fn test_preference_parse() {
        assert_eq!(
            "elevenlabs".parse::<SpeechPreference>().unwrap(),
            SpeechPreference::ElevenLabs
        );
        assert_eq!(
            "OpenAI".parse::<SpeechPreference>().unwrap(),
            SpeechPreference::OpenAi
        );
    }

    #[test]
    fn test_preference_rejects_unknown() {
        let err = "polly".parse::<SpeechPreference>().unwrap_err();
        assert!(err.contains("polly"));
    }

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            SpeechError::from_status(401, String::new()),
            SpeechError::Denied(401)
        ));
        assert!(matches!(
            SpeechError::from_status(403, String::new()),
            SpeechError::Denied(403)
        ));
        assert!(matches!(
            SpeechError::from_status(429, String::new()),
            SpeechError::RateLimited
        ));
        assert!(matches!(
            SpeechError::from_status(500, String::new()),
            SpeechError::Status { status: 500, .. }
        ));
    }

    #[test]
    fn test_fallback_triggers() {
        assert!(SpeechError::Denied(401).triggers_fallback(false));
        assert!(SpeechError::RateLimited.triggers_fallback(false));
        assert!(SpeechError::Transport("timeout".into()).triggers_fallback(false));

        let server = SpeechError::Status {
            status: 500,
            message: "boom".into(),
        };
        assert!(!server.triggers_fallback(false));
        assert!(server.triggers_fallback(true));

        // 4xx other than auth/rate-limit never falls back.
        let bad_request = SpeechError::Status {
            status: 400,
            message: "bad".into(),
        };
        assert!(!bad_request.triggers_fallback(true));
    }
}
