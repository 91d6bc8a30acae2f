//! Shared domain types for Stagecall.
//!
//! This crate contains the core domain types used across the Stagecall
//! engine: conversation turns, chat messages, synthesized audio, and
//! their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, thiserror.

pub mod error;
pub mod llm;
pub mod session;
pub mod speech;
