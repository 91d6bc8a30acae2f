//! Speech synthesis: provider port, two-tier fallback router, and the
//! audio handle cache.

pub mod cache;
pub mod provider;
pub mod router;
