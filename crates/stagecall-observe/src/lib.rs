//! Observability setup for Stagecall.

pub mod tracing_setup;
