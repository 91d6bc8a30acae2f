use thiserror::Error;

use crate::speech::SpeechError;

/// Errors surfaced by the engine pipeline.
///
/// `Configuration` is detected synchronously before any network call
/// and is fatal for the operation; `Upstream` is a provider
/// non-success or transport failure, surfaced after any applicable
/// fallback has been exhausted. Cache misses are `Option::None`, not
/// an error.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("upstream error{}: {message}", status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Upstream {
        status: Option<u16>,
        message: String,
    },
}

impl From<SpeechError> for EngineError {
    fn from(err: SpeechError) -> Self {
        match err {
            SpeechError::NotConfigured => {
                EngineError::Configuration("speech provider credentials are not configured".into())
            }
            other => EngineError::Upstream {
                status: other.status(),
                message: other.to_string(),
            },
        }
    }
}

/// Errors from startup-time configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {message}")]
    Invalid { var: String, message: String },

    #[error("no speech provider credentials configured (set ELEVENLABS_API_KEY or OPENAI_API_KEY)")]
    NoSpeechCredentials,
}
