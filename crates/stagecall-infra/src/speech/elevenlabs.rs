//! ElevenLabsSpeech -- [`SpeechSynthesizer`] implementation for the
//! ElevenLabs text-to-speech API
//! (`/v1/text-to-speech/{voice_id}`).

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use stagecall_core::speech::provider::SpeechSynthesizer;
use stagecall_types::speech::SpeechError;

/// Request timeout for synthesis calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// ElevenLabs synthesis model.
const MODEL_ID: &str = "eleven_multilingual_v2";

const ERROR_BODY_LIMIT: usize = 300;

/// ElevenLabs text-to-speech client.
pub struct ElevenLabsSpeech {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
    voice_id: String,
}

#[derive(Serialize)]
struct VoiceSettings {
    stability: f64,
    similarity_boost: f64,
}

#[derive(Serialize)]
struct SynthesisBody<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

impl ElevenLabsSpeech {
    pub fn new(api_key: Option<SecretString>, voice_id: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_key,
            base_url: "https://api.elevenlabs.io".to_string(),
            voice_id,
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn body<'a>(&self, text: &'a str) -> SynthesisBody<'a> {
        SynthesisBody {
            text,
            model_id: MODEL_ID,
            voice_settings: VoiceSettings {
                stability: 0.5,
                similarity_boost: 0.75,
            },
        }
    }
}

impl SpeechSynthesizer for ElevenLabsSpeech {
    fn name(&self) -> &str {
        "elevenlabs"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let api_key = self.api_key.as_ref().ok_or(SpeechError::NotConfigured)?;

        let url = format!("{}/v1/text-to-speech/{}", self.base_url, self.voice_id);
        let response = self
            .client
            .post(&url)
            .header("xi-api-key", api_key.expose_secret())
            .header("accept", "audio/mpeg")
            .json(&self.body(text))
            .send()
            .await
            .map_err(|e| SpeechError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::from_status(
                status.as_u16(),
                truncate(&body, ERROR_BODY_LIMIT),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SpeechError::Transport(format!("failed to read audio body: {e}")))?;
        Ok(bytes.to_vec())
    }
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
