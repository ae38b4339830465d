//! HTTP request extraction shared by handlers.

/// Device API key extraction
pub mod auth;
