//! HTTP delivery layer.
//!
//! Axum-based routes for the web UI, Twilio webhooks, and audio
//! serving, with CORS support and request tracing.

pub mod error;
pub mod handlers;
pub mod router;
