//! OpenAiChatClient -- concrete [`ChatProvider`] implementation for
//! the OpenAI chat-completions API (`/v1/chat/completions`).
//!
//! Carries the fixed sampling temperature and hard output-token cap;
//! fails with a configuration error before any network I/O when the
//! credential is absent. The API key is wrapped in
//! [`secrecy::SecretString`] and is never logged or included in
//! `Debug` output.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use stagecall_core::reply::ChatProvider;
use stagecall_types::error::EngineError;
use stagecall_types::llm::ChatMessage;

/// Request timeout for chat completions.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum provider error-body length carried in error messages.
const ERROR_BODY_LIMIT: usize = 300;

/// OpenAI chat-completion client.
pub struct OpenAiChatClient {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: String,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiChatClient {
    /// Create a new client.
    ///
    /// `api_key` may be absent; `complete` then fails with a
    /// configuration error before any request is sent.
    pub fn new(api_key: Option<SecretString>, model: String, temperature: f64, max_tokens: u32) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_key,
            base_url: "https://api.openai.com".to_string(),
            model,
            temperature,
            max_tokens,
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn body<'a>(&'a self, messages: &'a [ChatMessage]) -> ChatCompletionBody<'a> {
        ChatCompletionBody {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.to_string(),
                    content: &m.content,
                })
                .collect(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

// OpenAiChatClient intentionally does NOT derive Debug; the
// SecretString field keeps the key out of logs either way.

impl ChatProvider for OpenAiChatClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, EngineError> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            EngineError::Configuration("OPENAI_API_KEY is not set".to_string())
        })?;

        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key.expose_secret())
            .json(&self.body(messages))
            .send()
            .await
            .map_err(|e| EngineError::Upstream {
                status: None,
                message: format!("chat request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Upstream {
                status: Some(status.as_u16()),
                message: truncate(&body, ERROR_BODY_LIMIT),
            });
        }

        let parsed: ChatCompletionResponse =
            response.json().await.map_err(|e| EngineError::Upstream {
                status: None,
                message: format!("failed to parse chat response: {e}"),
            })?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
