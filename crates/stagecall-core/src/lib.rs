//! Conversation pipeline for Stagecall.
//!
//! This crate defines the "ports" (provider traits) that the
//! infrastructure layer implements, plus the pipeline built on top of
//! them: session ledger, prompt composer, reply generator, speech
//! router, audio cache, and the [`engine::ShowEngine`] facade that
//! ties them together. It depends only on `stagecall-types` -- never
//! on `stagecall-infra` or any HTTP crate.

pub mod engine;
pub mod prompt;
pub mod reply;
pub mod session;
pub mod speech;
