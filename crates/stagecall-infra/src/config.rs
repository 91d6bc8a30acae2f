//! Runtime configuration loaded from the environment.
//!
//! All knobs are read once at startup into [`RuntimeConfig`] and
//! validated there: unrecognized provider preferences and unparsable
//! numeric values are rejected immediately rather than silently
//! defaulting. API keys are wrapped in [`SecretString`] so they never
//! appear in Debug output or logs.

use secrecy::SecretString;

use stagecall_types::error::ConfigError;
use stagecall_types::speech::SpeechPreference;

/// Default ElevenLabs voice ("Rachel").
pub const DEFAULT_ELEVENLABS_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";

/// Default OpenAI TTS voice.
pub const DEFAULT_OPENAI_TTS_VOICE: &str = "alloy";

/// Default chat-completion model.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// Startup configuration for the engine and delivery layer.
#[derive(Debug)]
pub struct RuntimeConfig {
    /// Chat credential; also the secondary speech credential.
    pub openai_api_key: Option<SecretString>,
    /// Primary speech credential.
    pub elevenlabs_api_key: Option<SecretString>,
    pub elevenlabs_voice_id: String,
    pub openai_tts_voice: String,
    pub chat_model: String,
    /// Which speech provider to try first.
    pub preference: SpeechPreference,
    /// Also fall back on 5xx statuses from the primary speech provider.
    pub fallback_on_server_error: bool,
    /// Prefix for audio references; empty yields origin-relative paths.
    pub public_base_url: String,
    /// Intro clip played at the start of a phone call.
    pub intro_mp3_url: Option<String>,
    pub history_window: usize,
    pub max_sessions: usize,
    pub tts_max_chars: usize,
    pub reply_max_tokens: u32,
    pub reply_temperature: f64,
    pub scenes_path: String,
}

impl RuntimeConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        // NotUnicode values are treated as absent; credentials must be
        // valid strings anyway.
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary lookup function (injectable for tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let preference = match lookup("SPEECH_PROVIDER") {
            Some(raw) => raw.parse().map_err(|message| ConfigError::Invalid {
                var: "SPEECH_PROVIDER".to_string(),
                message,
            })?,
            None => SpeechPreference::default(),
        };

        Ok(Self {
            openai_api_key: lookup("OPENAI_API_KEY").map(SecretString::from),
            elevenlabs_api_key: lookup("ELEVENLABS_API_KEY").map(SecretString::from),
            elevenlabs_voice_id: lookup("ELEVENLABS_VOICE_ID")
                .unwrap_or_else(|| DEFAULT_ELEVENLABS_VOICE_ID.to_string()),
            openai_tts_voice: lookup("OPENAI_TTS_VOICE")
                .unwrap_or_else(|| DEFAULT_OPENAI_TTS_VOICE.to_string()),
            chat_model: lookup("CHAT_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            preference,
            fallback_on_server_error: parse_or(&lookup, "SPEECH_FALLBACK_ON_5XX", false)?,
            public_base_url: lookup("PUBLIC_BASE_URL").unwrap_or_default(),
            intro_mp3_url: lookup("INTRO_MP3_URL").filter(|url| !url.is_empty()),
            history_window: parse_or(&lookup, "HISTORY_WINDOW", 10)?,
            max_sessions: parse_or(&lookup, "MAX_SESSIONS", 1024)?,
            tts_max_chars: parse_or(&lookup, "TTS_MAX_CHARS", 4000)?,
            reply_max_tokens: parse_or(&lookup, "REPLY_MAX_TOKENS", 120)?,
            reply_temperature: parse_or(&lookup, "REPLY_TEMPERATURE", 0.7)?,
            scenes_path: lookup("SCENES_PATH").unwrap_or_else(|| "scenes/call.json".to_string()),
        })
    }

    /// Fail fast when no speech provider has credentials.
    ///
    /// Called at startup so the condition surfaces before any request
    /// is served, never as a per-request silent failure.
    pub fn ensure_speech_credentials(&self) -> Result<(), ConfigError> {
        if self.elevenlabs_api_key.is_none() && self.openai_api_key.is_none() {
            return Err(ConfigError::NoSpeechCredentials);
        }
        Ok(())
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        Some(raw) => raw.parse().map_err(|err: T::Err| ConfigError::Invalid {
            var: var.to_string(),
            message: err.to_string(),
        }),
        None => Ok(default),
    }
}
