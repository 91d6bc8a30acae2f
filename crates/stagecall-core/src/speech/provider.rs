//! SpeechSynthesizer trait definition and its type-erasure wrapper.
//!
//! Every provider implements the same capability -- `synthesize(text)
//! -> bytes` -- so the router branches only on preference/fallback
//! order, never on provider identity.

use std::future::Future;
use std::pin::Pin;

use stagecall_types::speech::SpeechError;

/// Trait for speech-synthesis provider backends (ElevenLabs, OpenAI).
///
/// Uses native async fn in traits (RPITIT); see
/// [`BoxSpeechSynthesizer`] for the object-safe wrapper the router
/// holds.
pub trait SpeechSynthesizer: Send + Sync {
    /// Human-readable provider name (e.g., "elevenlabs", "openai").
    fn name(&self) -> &str;

    /// Whether credentials for this provider are present.
    ///
    /// An unconfigured provider is skipped without any network call.
    fn is_configured(&self) -> bool;

    /// MIME type of the audio this provider returns.
    fn content_type(&self) -> &str {
        "audio/mpeg"
    }

    /// Convert text to audio bytes, exactly as returned by the
    /// provider (no re-encoding).
    fn synthesize(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Vec<u8>, SpeechError>> + Send;
}

/// Object-safe version of [`SpeechSynthesizer`] with boxed futures.
///
/// Exists solely to enable dynamic dispatch; a blanket implementation
/// is provided for all types implementing `SpeechSynthesizer`.
pub trait SpeechSynthesizerDyn: Send + Sync {
    fn name(&self) -> &str;

    fn is_configured(&self) -> bool;

    fn content_type(&self) -> &str;

    fn synthesize_boxed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, SpeechError>> + Send + 'a>>;
}

impl<T: SpeechSynthesizer> SpeechSynthesizerDyn for T {
    fn name(&self) -> &str {
        SpeechSynthesizer::name(self)
    }

    fn is_configured(&self) -> bool {
        SpeechSynthesizer::is_configured(self)
    }

    fn content_type(&self) -> &str {
        SpeechSynthesizer::content_type(self)
    }

    fn synthesize_boxed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, SpeechError>> + Send + 'a>> {
        Box::pin(self.synthesize(text))
    }
}

/// Type-erased speech synthesizer for runtime provider selection.
///
/// Since `SpeechSynthesizer` uses RPITIT, it cannot be a trait object
/// directly; this wrapper delegates to the inner
/// `SpeechSynthesizerDyn` object.
pub struct BoxSpeechSynthesizer {
    inner: Box<dyn SpeechSynthesizerDyn + Send + Sync>,
}

impl BoxSpeechSynthesizer {
    /// Wrap a concrete synthesizer in a type-erased box.
    pub fn new<T: SpeechSynthesizer + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn is_configured(&self) -> bool {
        self.inner.is_configured()
    }

    pub fn content_type(&self) -> &str {
        self.inner.content_type()
    }

    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        self.inner.synthesize_boxed(text).await
    }
}
