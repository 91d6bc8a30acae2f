//! Axum router configuration with middleware.
//!
//! Middleware: CORS (open, the web UI may be hosted anywhere), tracing.
//!
//! The stage-side web UI is served from `public/` when that directory
//! exists. API routes take priority; if the directory is absent, only
//! the API is served.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        // Web performance
        .route("/web-act", post(handlers::act::web_act))
        .route("/web-tts", post(handlers::act::web_tts))
        // Audio serving
        .route("/tts/{id}", get(handlers::audio::get_tts))
        .route("/audio", get(handlers::audio::proxy_audio))
        // Twilio webhooks
        .route("/voice", post(handlers::telephony::voice))
        .route("/voice/act", post(handlers::telephony::voice_act))
        // Diagnostics
        .route("/scenes", get(handlers::diag::get_scenes))
        .route("/debug", get(handlers::diag::get_debug))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Serve the stage-side web UI from disk if the directory exists.
    let web_dir = std::env::var("STAGECALL_WEB_DIR").unwrap_or_else(|_| "public".to_string());
    if std::path::Path::new(&web_dir).exists() {
        router = router.fallback_service(ServeDir::new(&web_dir));
        tracing::info!(path = %web_dir, "Static file serving enabled");
    }

    router
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
