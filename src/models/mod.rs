//! Data models representing database entities and API payloads.

/// Scan device model
pub mod device;
/// Member and membership models
pub mod member;
/// Scan request/response and audit log models
pub mod scan;
