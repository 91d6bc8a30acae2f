//! Stagecall server entry point.
//!
//! Binary name: `stagecall`
//!
//! Loads configuration from the environment, wires the engine, and
//! serves the web, Twilio, and audio routes.

mod http;
mod state;

use std::net::SocketAddr;

use clap::Parser;

use stagecall_infra::config::RuntimeConfig;

use http::router::build_router;
use state::AppState;

#[derive(Parser)]
#[command(name = "stagecall", version, about = "Voice-driven interactive theater engine")]
struct Cli {
    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    stagecall_observe::tracing_setup::init_tracing("info,stagecall=debug")
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let config = RuntimeConfig::from_env()?;
    // Speech credentials are load-bearing; refuse to start without any.
    config.ensure_speech_credentials()?;

    let state = AppState::init(config)?;
    let router = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Stagecall listening");
    axum::serve(listener, router).await?;

    Ok(())
}
