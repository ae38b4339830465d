//! HTTP request handlers (route handlers).
//!
//! Handlers extract request data, hand it to the services, and map the
//! outcome to an HTTP response.

/// Service health endpoint
pub mod health;
/// QR scan authorization endpoint
pub mod scan;
