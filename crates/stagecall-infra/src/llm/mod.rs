//! Chat-completion provider adapters.

pub mod openai;

pub use openai::OpenAiChatClient;
