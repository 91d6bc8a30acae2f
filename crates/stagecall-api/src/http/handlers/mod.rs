//! HTTP request handlers.

pub mod act;
pub mod audio;
pub mod diag;
pub mod telephony;
