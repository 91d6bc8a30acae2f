//! Infrastructure layer for Stagecall.
//!
//! Contains implementations of the provider ports defined in
//! `stagecall-core`: the OpenAI chat-completion client, the
//! ElevenLabs and OpenAI speech-synthesis clients, and env-driven
//! runtime configuration.

pub mod config;
pub mod llm;
pub mod speech;
