//! OpenAiSpeech -- [`SpeechSynthesizer`] implementation for the
//! OpenAI audio API (`/v1/audio/speech`).
//!
//! Shares the chat credential (`OPENAI_API_KEY`), which is what makes
//! it the natural secondary when only one vendor account is set up.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use stagecall_core::speech::provider::SpeechSynthesizer;
use stagecall_types::speech::SpeechError;

/// Request timeout for synthesis calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// OpenAI speech model.
const MODEL: &str = "tts-1";

const ERROR_BODY_LIMIT: usize = 300;

/// OpenAI text-to-speech client.
pub struct OpenAiSpeech {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
    voice: String,
}

#[derive(Serialize)]
struct SynthesisBody<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
}

impl OpenAiSpeech {
    pub fn new(api_key: Option<SecretString>, voice: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_key,
            base_url: "https://api.openai.com".to_string(),
            voice,
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn body<'a>(&'a self, text: &'a str) -> SynthesisBody<'a> {
        SynthesisBody {
            model: MODEL,
            voice: &self.voice,
            input: text,
        }
    }
}

impl SpeechSynthesizer for OpenAiSpeech {
    fn name(&self) -> &str {
        "openai"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let api_key = self.api_key.as_ref().ok_or(SpeechError::NotConfigured)?;

        let url = format!("{}/v1/audio/speech", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key.expose_secret())
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
