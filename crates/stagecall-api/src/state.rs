//! Application state wiring the engine together.
//!
//! The engine is generic over its chat provider, but AppState pins it
//! to the concrete infra implementations. Both speech vendors are
//! always constructed; [`RuntimeConfig::preference`] only decides
//! their order in the router.

use std::sync::Arc;
use std::time::Duration;

use stagecall_core::engine::ShowEngine;
use stagecall_core::session::SessionLedger;
use stagecall_core::speech::cache::AudioCache;
use stagecall_core::speech::provider::BoxSpeechSynthesizer;
use stagecall_core::speech::router::{RouterOptions, SpeechRouter};
use stagecall_infra::config::RuntimeConfig;
use stagecall_infra::llm::openai::OpenAiChatClient;
use stagecall_infra::speech::elevenlabs::ElevenLabsSpeech;
use stagecall_infra::speech::openai_tts::OpenAiSpeech;
use stagecall_types::speech::SpeechPreference;

/// Concrete engine type with the chat generic pinned to infra.
pub type ConcreteShowEngine = ShowEngine<OpenAiChatClient>;

/// Shared application state holding the engine and request-time config.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ConcreteShowEngine>,
    /// Scene script served verbatim on `/scenes`.
    pub scenes: Arc<serde_json::Value>,
    /// Intro clip played at the start of a phone call, if configured.
    pub intro_mp3_url: Option<String>,
    pub public_base_url: String,
    /// Client for the same-origin audio proxy.
    pub proxy_client: reqwest::Client,
}

impl AppState {
    /// Wire the engine from validated configuration.
    pub fn init(config: RuntimeConfig) -> anyhow::Result<Self> {
        let chat = OpenAiChatClient::new(
            config.openai_api_key.clone(),
            config.chat_model,
            config.reply_temperature,
            config.reply_max_tokens,
        );

        let elevenlabs = BoxSpeechSynthesizer::new(ElevenLabsSpeech::new(
            config.elevenlabs_api_key,
            config.elevenlabs_voice_id,
        ));
        let openai_tts = BoxSpeechSynthesizer::new(OpenAiSpeech::new(
            config.openai_api_key,
            config.openai_tts_voice,
        ));

        let (primary, secondary) = match config.preference {
            SpeechPreference::ElevenLabs => (elevenlabs, openai_tts),
            SpeechPreference::OpenAi => (openai_tts, elevenlabs),
        };

        let router = SpeechRouter::new(
            primary,
            secondary,
            RouterOptions {
                max_chars: config.tts_max_chars,
                fallback_on_server_error: config.fallback_on_server_error,
            },
        )?;

        let ledger = SessionLedger::with_limits(config.history_window, config.max_sessions);
        let engine = ShowEngine::new(
            chat,
            router,
            ledger,
            AudioCache::new(),
            config.public_base_url.clone(),
        );

        let proxy_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            engine: Arc::new(engine),
            scenes: Arc::new(load_scenes(&config.scenes_path)),
            intro_mp3_url: config.intro_mp3_url,
            public_base_url: config.public_base_url,
            proxy_client,
        })
    }
}

/// Load the scene script, falling back to a minimal default.
///
/// A missing or malformed file is logged and downgraded rather than
/// aborting startup; the show can run without a script.
fn load_scenes(path: &str) -> serde_json::Value {
    match std::fs::read_to_string(path) {
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(scenes) => scenes,
            Err(err) => {
                tracing::warn!(path, error = %err, "Scene file is not valid JSON, using default");
                default_scenes()
            }
        },
        Err(err) => {
            tracing::warn!(path, error = %err, "Scene file not readable, using default");
            default_scenes()
        }
    }
}

fn default_scenes() -> serde_json::Value {
    serde_json::json!({
        "persona": { "systemPrompt": "Du är en dramatisk AI." },
        "acts": [],
    })
}
