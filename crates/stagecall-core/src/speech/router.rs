//! Two-tier speech synthesis with automatic fallback.
//!
//! The router tries the preferred (primary) provider first and falls
//! back to the secondary only for enumerated failure classes:
//!
//! - primary credentials absent -> skip straight to the secondary,
//!   no primary network call;
//! - primary returns 401/403/429 -> fall back;
//! - primary transport failure (network/timeout) -> fall back;
//! - any other non-success status -> hard failure, no fallback
//!   (explicit policy; the `fallback_on_server_error` option extends
//!   the trigger set to 5xx).
//!
//! The secondary is invoked with the same length-capped text and the
//! same output handling. Callers observe only the returned handle,
//! never which provider served the request. If both providers fail,
//! the terminal (last) error is propagated with status/message detail.

use stagecall_types::error::EngineError;
use stagecall_types::speech::{AudioHandle, SynthesizedAudio};

use super::cache::AudioCache;
use super::provider::BoxSpeechSynthesizer;

/// Default character budget for synthesis input.
pub const DEFAULT_MAX_CHARS: usize = 4000;

/// Tuning knobs for the router.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// Maximum number of characters sent to a provider.
    pub max_chars: usize,
    /// Also fall back on 5xx statuses from the primary.
    pub fallback_on_server_error: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            fallback_on_server_error: false,
        }
    }
}

/// Routes synthesis requests through the primary/secondary pair.
pub struct SpeechRouter {
    primary: BoxSpeechSynthesizer,
    secondary: BoxSpeechSynthesizer,
    options: RouterOptions,
}

impl SpeechRouter {
    /// Create a router over an ordered provider pair.
    ///
    /// Fails with [`EngineError::Configuration`] when neither provider
    /// has credentials -- detected here, before any request is served.
    pub fn new(
        primary: BoxSpeechSynthesizer,
        secondary: BoxSpeechSynthesizer,
        options: RouterOptions,
    ) -> Result<Self, EngineError> {
        if !primary.is_configured() && !secondary.is_configured() {
            return Err(EngineError::Configuration(
                "no speech provider credentials configured".to_string(),
            ));
        }
        Ok(Self {
            primary,
            secondary,
            options,
        })
    }

    /// Synthesize `text` and insert the bytes into `cache`.
    ///
    /// Returns the fresh handle under which the audio was stored.
    pub async fn synthesize(
        &self,
        text: &str,
        cache: &AudioCache,
    ) -> Result<AudioHandle, EngineError> {
        let text = truncate_chars(text, self.options.max_chars);

        let mut last_err = None;
        if self.primary.is_configured() {
            match self.primary.synthesize(text).await {
                Ok(bytes) => {
                    return Ok(self.store(cache, bytes, self.primary.content_type()));
                }
                Err(err) if err.triggers_fallback(self.options.fallback_on_server_error) => {
                    tracing::warn!(
                        provider = %self.primary.name(),
                        error = %err,
                        "Primary speech provider failed, trying secondary"
                    );
                    last_err = Some(err);
                }
                Err(err) => {
                    tracing::error!(
                        provider = %self.primary.name(),
                        error = %err,
                        "Primary speech provider failed, no fallback for this error class"
                    );
                    return Err(err.into());
                }
            }
        } else {
            tracing::debug!(
                provider = %self.primary.name(),
                "Primary speech provider unconfigured, skipping"
            );
        }

        if !self.secondary.is_configured() {
            // Construction guarantees at least one configured provider,
            // so reaching here means the primary failed with a
            // fallback-class error and there is nowhere to go.
            return Err(last_err
                .map(Into::into)
                .unwrap_or_else(|| {
                    EngineError::Configuration(
                        "no speech provider credentials configured".to_string(),
                    )
                }));
        }

        match self.secondary.synthesize(text).await {
            Ok(bytes) => Ok(self.store(cache, bytes, self.secondary.content_type())),
            Err(err) => {
                tracing::error!(
                    provider = %self.secondary.name(),
                    error = %err,
                    "Secondary speech provider failed, synthesis exhausted"
                );
                Err(err.into())
            }
        }
    }

    fn store(&self, cache: &AudioCache, bytes: Vec<u8>, content_type: &str) -> AudioHandle {
        cache.insert(SynthesizedAudio {
            handle: AudioHandle::new(),
            content_type: content_type.to_string(),
            bytes,
        })
    }
}

/// Truncate to at most `max_chars` characters on a char boundary.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use stagecall_types::speech::SpeechError;

    use crate::speech::provider::SpeechSynthesizer;

    #[derive(Clone)]
    enum MockOutcome {
        Bytes(Vec<u8>),
        Fail(SpeechError),
    }

    struct MockSpeech {
        name: &'static str,
        configured: bool,
        outcome: MockOutcome,
        calls: std::sync::Arc<AtomicUsize>,
        received: std::sync::Arc<Mutex<Vec<String>>>,
    }

    impl MockSpeech {
        fn ok(name: &'static str, bytes: &[u8]) -> Self {
            Self {
                name,
                configured: true,
                outcome: MockOutcome::Bytes(bytes.to_vec()),
                calls: Default::default(),
                received: Default::default(),
            }
        }

        fn failing(name: &'static str, err: SpeechError) -> Self {
            Self {
                name,
                configured: true,
                outcome: MockOutcome::Fail(err),
                calls: Default::default(),
                received: Default::default(),
            }
        }

        fn unconfigured(name: &'static str) -> Self {
            Self {
                name,
                configured: false,
                outcome: MockOutcome::Fail(SpeechError::NotConfigured),
                calls: Default::default(),
                received: Default::default(),
            }
        }

        fn probes(&self) -> (std::sync::Arc<AtomicUsize>, std::sync::Arc<Mutex<Vec<String>>>) {
            (self.calls.clone(), self.received.clone())
        }
    }

    impl SpeechSynthesizer for MockSpeech {
        fn name(&self) -> &str {
            self.name
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        fn synthesize(
            &self,
            text: &str,
        ) -> impl Future<Output = Result<Vec<u8>, SpeechError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.received.lock().unwrap().push(text.to_string());
            let outcome = self.outcome.clone();
            async move {
                match outcome {
                    MockOutcome::Bytes(bytes) => Ok(bytes),
                    MockOutcome::Fail(err) => Err(err),
                }
            }
        }
    }

    fn router(primary: MockSpeech, secondary: MockSpeech) -> SpeechRouter {
        SpeechRouter::new(
            BoxSpeechSynthesizer::new(primary),
            BoxSpeechSynthesizer::new(secondary),
            RouterOptions::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_primary_success_stores_exact_bytes() {
        let primary = MockSpeech::ok("primary", b"primary-mp3");
        let secondary = MockSpeech::ok("secondary", b"secondary-mp3");
        let (secondary_calls, _) = secondary.probes();

        let cache = AudioCache::new();
        let handle = router(primary, secondary)
            .synthesize("Hej", &cache)
            .await
            .unwrap();

        assert_eq!(cache.fetch(&handle).unwrap().bytes, b"primary-mp3");
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unconfigured_primary_skips_to_secondary() {
        let primary = MockSpeech::unconfigured("primary");
        let secondary = MockSpeech::ok("secondary", b"secondary-mp3");
        let (primary_calls, _) = primary.probes();

        let cache = AudioCache::new();
        let handle = router(primary, secondary)
            .synthesize("Hej", &cache)
            .await
            .unwrap();

        assert_eq!(cache.fetch(&handle).unwrap().bytes, b"secondary-mp3");
        assert_eq!(primary_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rate_limit_triggers_exactly_one_secondary_call() {
        let primary = MockSpeech::failing("primary", SpeechError::RateLimited);
        let secondary = MockSpeech::ok("secondary", b"fallback-mp3");
        let (primary_calls, _) = primary.probes();
        let (secondary_calls, _) = secondary.probes();

        let cache = AudioCache::new();
        let handle = router(primary, secondary)
            .synthesize("Hej", &cache)
            .await
            .unwrap();

        assert_eq!(cache.fetch(&handle).unwrap().bytes, b"fallback-mp3");
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_denied_and_transport_trigger_fallback() {
        for err in [
            SpeechError::Denied(401),
            SpeechError::Denied(403),
            SpeechError::Transport("connection timed out".into()),
        ] {
            let primary = MockSpeech::failing("primary", err);
            let secondary = MockSpeech::ok("secondary", b"fallback-mp3");

            let cache = AudioCache::new();
            let handle = router(primary, secondary)
                .synthesize("Hej", &cache)
                .await
                .unwrap();
            assert_eq!(cache.fetch(&handle).unwrap().bytes, b"fallback-mp3");
        }
    }

    #[tokio::test]
    async fn test_server_error_is_terminal_without_flag() {
        let primary = MockSpeech::failing(
            "primary",
            SpeechError::Status {
                status: 500,
                message: "internal error".into(),
            },
        );
        let secondary = MockSpeech::ok("secondary", b"fallback-mp3");
        let (secondary_calls, _) = secondary.probes();

        let cache = AudioCache::new();
        let err = router(primary, secondary)
            .synthesize("Hej", &cache)
            .await
            .unwrap_err();

        match err {
            EngineError::Upstream { status, .. } => assert_eq!(status, Some(500)),
            other => panic!("expected Upstream, got {other:?}"),
        }
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_falls_back_with_flag() {
        let primary = MockSpeech::failing(
            "primary",
            SpeechError::Status {
                status: 503,
                message: "unavailable".into(),
            },
        );
        let secondary = MockSpeech::ok("secondary", b"fallback-mp3");

        let cache = AudioCache::new();
        let router = SpeechRouter::new(
            BoxSpeechSynthesizer::new(primary),
            BoxSpeechSynthesizer::new(secondary),
            RouterOptions {
                fallback_on_server_error: true,
                ..RouterOptions::default()
            },
        )
        .unwrap();

        let handle = router.synthesize("Hej", &cache).await.unwrap();
        assert_eq!(cache.fetch(&handle).unwrap().bytes, b"fallback-mp3");
    }

    #[tokio::test]
    async fn test_both_fail_propagates_terminal_error() {
        let primary = MockSpeech::failing("primary", SpeechError::RateLimited);
        let secondary = MockSpeech::failing(
            "secondary",
            SpeechError::Status {
                status: 502,
                message: "bad gateway".into(),
            },
        );

        let cache = AudioCache::new();
        let err = router(primary, secondary)
            .synthesize("Hej", &cache)
            .await
            .unwrap_err();

        match err {
            EngineError::Upstream { status, message } => {
                assert_eq!(status, Some(502));
                assert!(message.contains("bad gateway"));
            }
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fallback_with_unconfigured_secondary_keeps_primary_error() {
        let primary = MockSpeech::failing("primary", SpeechError::RateLimited);
        let secondary = MockSpeech::unconfigured("secondary");
        let (secondary_calls, _) = secondary.probes();

        let cache = AudioCache::new();
        let err = router(primary, secondary)
            .synthesize("Hej", &cache)
            .await
            .unwrap_err();

        match err {
            EngineError::Upstream { status, .. } => assert_eq!(status, Some(429)),
            other => panic!("expected Upstream, got {other:?}"),
        }
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_neither_configured_is_a_construction_error() {
        let result = SpeechRouter::new(
            BoxSpeechSynthesizer::new(MockSpeech::unconfigured("primary")),
            BoxSpeechSynthesizer::new(MockSpeech::unconfigured("secondary")),
            RouterOptions::default(),
        );
        assert!(matches!(result, Err(EngineError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_text_is_truncated_for_both_providers() {
        let primary = MockSpeech::failing("primary", SpeechError::RateLimited);
        let secondary = MockSpeech::ok("secondary", b"mp3");
        let (_, primary_seen) = primary.probes();
        let (_, secondary_seen) = secondary.probes();

        let cache = AudioCache::new();
        let router = SpeechRouter::new(
            BoxSpeechSynthesizer::new(primary),
            BoxSpeechSynthesizer::new(secondary),
            RouterOptions {
                max_chars: 5,
                ..RouterOptions::default()
            },
        )
        .unwrap();

        router.synthesize("abcdefghij", &cache).await.unwrap();
        assert_eq!(primary_seen.lock().unwrap()[0], "abcde");
        assert_eq!(secondary_seen.lock().unwrap()[0], "abcde");
    }

    #[tokio::test]
    async fn test_handles_are_unique_per_call() {
        let cache = AudioCache::new();
        let router = router(
            MockSpeech::ok("primary", b"mp3"),
            MockSpeech::ok("secondary", b"mp3"),
        );
        let first = router.synthesize("en", &cache).await.unwrap();
        let second = router.synthesize("två", &cache).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("hej på dig", 6), "hej på");
        assert_eq!(truncate_chars("kort", 100), "kort");
        assert_eq!(truncate_chars("åäö", 2), "åä");
    }
}
