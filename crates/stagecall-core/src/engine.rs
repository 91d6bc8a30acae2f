//! Engine facade tying the pipeline together.
//!
//! `ShowEngine` owns the session ledger, reply generator, speech
//! router, and audio cache -- explicitly owned store instances
//! injected at construction, never process-wide globals, so tests can
//! instantiate isolated engines. Each request runs the strictly
//! sequential pipeline: ledger get -> compose -> provider -> ledger
//! push -> synthesize -> cache insert.

use std::sync::Arc;

use stagecall_types::error::EngineError;
use stagecall_types::session::Turn;
use stagecall_types::speech::{AudioHandle, SynthesizedAudio};

use crate::reply::{ChatProvider, ReplyGenerator};
use crate::session::SessionLedger;
use crate::speech::cache::AudioCache;
use crate::speech::router::SpeechRouter;

/// A retrievable reference to one cached audio payload.
#[derive(Debug, Clone)]
pub struct SpeechRef {
    pub handle: AudioHandle,
    /// `{public_base}/tts/{handle}` -- what the delivery layer hands out.
    pub url: String,
}

/// The result of one full utterance -> reply -> audio pipeline run.
#[derive(Debug, Clone)]
pub struct StageLine {
    pub reply: String,
    pub audio_url: String,
}

/// The conversation engine behind every web request and phone call.
pub struct ShowEngine<C: ChatProvider> {
    ledger: SessionLedger,
    generator: ReplyGenerator<C>,
    router: SpeechRouter,
    cache: AudioCache,
    public_base_url: String,
}

impl<C: ChatProvider> ShowEngine<C> {
    /// Wire an engine from its injected parts.
    ///
    /// `public_base_url` prefixes audio references; empty yields
    /// origin-relative `/tts/{handle}` paths. A trailing slash is
    /// stripped.
    pub fn new(
        chat: C,
        router: SpeechRouter,
        ledger: SessionLedger,
        cache: AudioCache,
        public_base_url: impl Into<String>,
    ) -> Self {
        let mut public_base_url = public_base_url.into();
        while public_base_url.ends_with('/') {
            public_base_url.pop();
        }
        Self {
            ledger,
            generator: ReplyGenerator::new(chat),
            router,
            cache,
            public_base_url,
        }
    }

    /// Ordered history for a session; empty if unknown.
    pub fn session_history(&self, session_id: &str) -> Vec<Turn> {
        self.ledger.get(session_id)
    }

    /// Drop all history for a session. Idempotent.
    pub fn reset_session(&self, session_id: &str) {
        self.ledger.reset(session_id);
    }

    /// Generate an in-character reply and record the turn.
    pub async fn generate_reply(
        &self,
        session_id: &str,
        utterance: &str,
        persona: Option<&str>,
    ) -> Result<String, EngineError> {
        let history = self.ledger.get(session_id);
        let reply = self.generator.generate(&history, utterance, persona).await?;
        self.ledger.push(session_id, utterance, reply.as_str());
        Ok(reply)
    }

    /// Synthesize text to cached audio and return its reference.
    pub async fn synthesize_speech(&self, text: &str) -> Result<SpeechRef, EngineError> {
        let handle = self.router.synthesize(text, &self.cache).await?;
        Ok(SpeechRef {
            handle,
            url: self.audio_url(&handle),
        })
    }

    /// The full pipeline for one audience utterance.
    pub async fn respond(
        &self,
        session_id: &str,
        utterance: &str,
        persona: Option<&str>,
    ) -> Result<StageLine, EngineError> {
        let reply = self.generate_reply(session_id, utterance, persona).await?;
        let speech = self.synthesize_speech(&reply).await?;
        tracing::info!(
            session_id,
            handle = %speech.handle,
            reply_chars = reply.chars().count(),
            "Pipeline complete"
        );
        Ok(StageLine {
            reply,
            audio_url: speech.url,
        })
    }

    /// Cached audio by handle; `None` on unknown or expired handles.
    pub fn audio_fetch(&self, handle: &AudioHandle) -> Option<Arc<SynthesizedAudio>> {
        self.cache.fetch(handle)
    }

    /// Render the retrievable reference for a handle.
    pub fn audio_url(&self, handle: &AudioHandle) -> String {
        format!("{}/tts/{handle}", self.public_base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;

    use stagecall_types::llm::ChatMessage;
    use stagecall_types::speech::SpeechError;

    use crate::speech::provider::{BoxSpeechSynthesizer, SpeechSynthesizer};
    use crate::speech::router::RouterOptions;

    struct EchoChat;

    impl ChatProvider for EchoChat {
        fn name(&self) -> &str {
            "echo"
        }

        fn complete(
            &self,
            messages: &[ChatMessage],
        ) -> impl Future<Output = Result<String, EngineError>> + Send {
            let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
            async move { Ok(format!("svar på: {last}")) }
        }
    }

    struct FixedSpeech(&'static [u8]);

    impl SpeechSynthesizer for FixedSpeech {
        fn name(&self) -> &str {
            "fixed"
        }

        fn is_configured(&self) -> bool {
            true
        }

        fn synthesize(
            &self,
            _text: &str,
        ) -> impl Future<Output = Result<Vec<u8>, SpeechError>> + Send {
            let bytes = self.0.to_vec();
            async move { Ok(bytes) }
        }
    }

    fn engine(public_base: &str) -> ShowEngine<EchoChat> {
        let router = SpeechRouter::new(
            BoxSpeechSynthesizer::new(FixedSpeech(b"mp3")),
            BoxSpeechSynthesizer::new(FixedSpeech(b"mp3-b")),
            RouterOptions::default(),
        )
        .unwrap();
        ShowEngine::new(
            EchoChat,
            router,
            SessionLedger::new(),
            AudioCache::new(),
            public_base,
        )
    }

    #[tokio::test]
    async fn test_generate_reply_records_turn() {
        let engine = engine("");
        let reply = engine.generate_reply("s1", "hej", None).await.unwrap();
        assert_eq!(reply, "svar på: hej");
        assert_eq!(
            engine.session_history("s1"),
            vec![Turn::new("hej", "svar på: hej")]
        );
    }

    #[tokio::test]
    async fn test_respond_produces_retrievable_audio() {
        let engine = engine("");
        let line = engine.respond("s1", "hej", None).await.unwrap();
        assert_eq!(line.reply, "svar på: hej");

        let handle: AudioHandle = line
            .audio_url
            .rsplit('/')
            .next()
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(engine.audio_fetch(&handle).unwrap().bytes, b"mp3");
    }

    #[tokio::test]
    async fn test_audio_url_prefixes_public_base() {
        let engine = engine("https://show.example/");
        let speech = engine.synthesize_speech("Hej").await.unwrap();
        assert!(speech.url.starts_with("https://show.example/tts/"));
        assert!(!speech.url.contains("//tts"));
    }

    #[tokio::test]
    async fn test_reset_clears_session() {
        let engine = engine("");
        engine.generate_reply("s1", "hej", None).await.unwrap();
        engine.reset_session("s1");
        assert!(engine.session_history("s1").is_empty());
    }

    #[tokio::test]
    async fn test_audio_fetch_unknown_handle_is_none() {
        let engine = engine("");
        assert!(engine.audio_fetch(&AudioHandle::new()).is_none());
    }
}
