//! Scan device model.
//!
//! A scan device is a physical QR reader mounted in one gym area. It
//! authenticates with a static API key sent in the `x-api-key` header.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A scan device resolved by API key, joined with its area and gym.
///
/// # Database Tables
///
/// Built from `scan_devices` joined with `gym_areas` and `gyms`. The API key
/// itself is never loaded back: the lookup matches on it and that is all the
/// caller needs.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScanDevice {
    /// Unique identifier, echoed by the device in every scan request body
    pub id: Uuid,

    /// Human-readable device label
    pub name: String,

    /// Area the device is mounted in; every scan event is tagged with it
    pub gym_area_id: Uuid,

    pub area_name: String,

    pub gym_name: String,

    /// Last time the device made an authenticated request
    pub last_seen_at: Option<DateTime<Utc>>,
}
