//! Speech-synthesis provider adapters.
//!
//! Both providers implement the same capability -- text in, raw audio
//! bytes out -- so the core router never branches on provider
//! identity.

pub mod elevenlabs;
pub mod openai_tts;

pub use elevenlabs::ElevenLabsSpeech;
pub use openai_tts::OpenAiSpeech;
