//! Language reply generation.
//!
//! [`ChatProvider`] is the port the infrastructure layer implements
//! (e.g. the OpenAI chat-completion client). [`ReplyGenerator`] calls
//! it exactly once per utterance -- no internal retry; retry policy is
//! the caller's decision -- and normalizes the returned text.

use stagecall_types::error::EngineError;
use stagecall_types::llm::ChatMessage;
use stagecall_types::session::Turn;

use crate::prompt;

/// Short acknowledgement substituted when the provider returns
/// empty or whitespace-only content.
pub const FALLBACK_ACK: &str = "Okej.";

/// Trait for chat-completion provider backends.
///
/// Uses native async fn in traits (RPITIT). The concrete
/// implementation carries the fixed sampling temperature and hard
/// output-length cap; it must fail with
/// [`EngineError::Configuration`] before any network I/O when its
/// credential is absent.
pub trait ChatProvider: Send + Sync {
    /// Human-readable provider name (e.g., "openai").
    fn name(&self) -> &str;

    /// Send the composed message sequence, returning the raw reply text.
    fn complete(
        &self,
        messages: &[ChatMessage],
    ) -> impl std::future::Future<Output = Result<String, EngineError>> + Send;
}

/// Generates one in-character reply per audience utterance.
pub struct ReplyGenerator<P: ChatProvider> {
    provider: P,
}

impl<P: ChatProvider> ReplyGenerator<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Compose the prompt and call the provider once.
    ///
    /// Returns trimmed reply text, or [`FALLBACK_ACK`] when the
    /// provider produced nothing usable.
    pub async fn generate(
        &self,
        history: &[Turn],
        utterance: &str,
        persona: Option<&str>,
    ) -> Result<String, EngineError> {
        let messages = prompt::compose(history, utterance, persona);
        let raw = self.provider.complete(&messages).await?;
        let reply = raw.trim();
        if reply.is_empty() {
            tracing::debug!(provider = %self.provider.name(), "Empty reply, substituting acknowledgement");
            Ok(FALLBACK_ACK.to_string())
        } else {
            Ok(reply.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockChat {
        result: Result<String, String>,
        calls: AtomicUsize,
        seen: std::sync::Mutex<Vec<ChatMessage>>,
    }

    impl MockChat {
        fn replying(text: &str) -> Self {
            Self {
                result: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
                seen: std::sync::Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                result: Err(message.to_string()),
                calls: AtomicUsize::new(0),
                seen: std::sync::Mutex::new(Vec::new()),
            }
        }
    }

    impl ChatProvider for MockChat {
        fn name(&self) -> &str {
            "mock"
        }

        fn complete(
            &self,
            messages: &[ChatMessage],
        ) -> impl Future<Output = Result<String, EngineError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.seen.lock().unwrap() = messages.to_vec();
            let result = self.result.clone();
            async move {
                result.map_err(|message| EngineError::Upstream {
                    status: Some(500),
                    message,
                })
            }
        }
    }

    #[tokio::test]
    async fn test_reply_is_trimmed() {
        let generator = ReplyGenerator::new(MockChat::replying("  Jaså, du vågar?  \n"));
        let reply = generator.generate(&[], "hej", None).await.unwrap();
        assert_eq!(reply, "Jaså, du vågar?");
    }

    #[tokio::test]
    async fn test_empty_reply_becomes_acknowledgement() {
        let generator = ReplyGenerator::new(MockChat::replying("   \n "));
        let reply = generator.generate(&[], "hej", None).await.unwrap();
        assert_eq!(reply, FALLBACK_ACK);
    }

    #[tokio::test]
    async fn test_provider_error_propagates_without_retry() {
        let generator = ReplyGenerator::new(MockChat::failing("boom"));
        let err = generator.generate(&[], "hej", None).await.unwrap_err();
        assert!(matches!(err, EngineError::Upstream { .. }));
        assert_eq!(generator.provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_provider_receives_composed_sequence() {
        let generator = ReplyGenerator::new(MockChat::replying("svar"));
        let history = vec![Turn::new("u1", "a1")];
        generator
            .generate(&history, "u2", Some("Persona"))
            .await
            .unwrap();

        let seen = generator.provider.seen.lock().unwrap().clone();
        assert_eq!(seen, prompt::compose(&history, "u2", Some("Persona")));
    }
}
