//! Scan request/response types and the scan audit log.
//!
//! This module defines:
//! - `ScanRequest`: loosely-typed JSON body as sent by devices
//! - `ValidatedScan`: the request after boundary validation
//! - `ScanResponse`: the decision returned to the device
//! - `NewScanEvent`: a row to append to the `scans` audit table

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::member::{MemberSummary, MembershipSummary};

/// Why a scan was refused.
///
/// Closed set; serialized in snake_case both in responses and in the
/// `scans.reason` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    MissingRequiredFields,
    UnauthorizedDevice,
    InvalidDevice,
    DeviceMismatch,
    MemberNotFound,
    MembershipExpired,
    InternalError,
}

impl DenialReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DenialReason::MissingRequiredFields => "missing_required_fields",
            DenialReason::UnauthorizedDevice => "unauthorized_device",
            DenialReason::InvalidDevice => "invalid_device",
            DenialReason::DeviceMismatch => "device_mismatch",
            DenialReason::MemberNotFound => "member_not_found",
            DenialReason::MembershipExpired => "membership_expired",
            DenialReason::InternalError => "internal_error",
        }
    }
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome recorded in the `scans.status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Allowed,
    Denied,
}

impl ScanStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ScanStatus::Allowed => "allowed",
            ScanStatus::Denied => "denied",
        }
    }
}

/// Request body posted by a scan device.
///
/// # JSON Example
///
/// ```json
/// {
///   "qr_token": "8f14e45f-ceea-467f-a8f6-1b0b8a3c2d11",
///   "device_id": "550e8400-e29b-41d4-a716-446655440000",
///   "scanned_at": "2024-06-15T08:30:00Z"
/// }
/// ```
///
/// Every field is optional at this stage; `validate` decides what is
/// acceptable.
#[derive(Debug, Default, Deserialize)]
pub struct ScanRequest {
    #[serde(default)]
    pub qr_token: Option<String>,

    #[serde(default)]
    pub device_id: Option<String>,

    #[serde(default)]
    pub scanned_at: Option<String>,
}

impl ScanRequest {
    /// Check required fields and parse the optional timestamp.
    ///
    /// # Errors
    ///
    /// `MissingRequiredFields` when `qr_token` or `device_id` is absent or
    /// empty. An unparseable `scanned_at` is not an error: it is dropped and
    /// the server clock is used instead.
    pub fn validate(self) -> Result<ValidatedScan, AppError> {
        let qr_token = self
            .qr_token
            .filter(|t| !t.is_empty())
            .ok_or(AppError::MissingRequiredFields)?;
        let device_id = self
            .device_id
            .filter(|d| !d.is_empty())
            .ok_or(AppError::MissingRequiredFields)?;

        let scanned_at = self.scanned_at.as_deref().and_then(|raw| {
            let parsed = parse_scan_time(raw);
            if parsed.is_none() {
                tracing::debug!(scanned_at = raw, "Ignoring unparseable scanned_at");
            }
            parsed
        });

        Ok(ValidatedScan {
            qr_token,
            device_id,
            scanned_at,
        })
    }
}

/// Parse a client-supplied scan timestamp.
///
/// Accepts RFC 3339, offset-less ISO-8601 date-times (read as UTC) and bare
/// dates (midnight UTC).
fn parse_scan_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// A scan request that passed boundary validation.
#[derive(Debug, Clone)]
pub struct ValidatedScan {
    pub qr_token: String,
    pub device_id: String,
    pub scanned_at: Option<DateTime<Utc>>,
}

impl ValidatedScan {
    /// Member id encoded in the QR token, if the token is a well-formed id.
    pub fn member_id(&self) -> Option<Uuid> {
        Uuid::parse_str(self.qr_token.trim()).ok()
    }

    /// Whether the body's `device_id` names the device `id`.
    pub fn claims_device(&self, id: Uuid) -> bool {
        Uuid::parse_str(self.device_id.trim()).is_ok_and(|claimed| claimed == id)
    }
}

/// Decision returned to the device.
///
/// # JSON Examples
///
/// Granted:
/// ```json
/// {
///   "allowed": true,
///   "member": { "first_name": "Alex", "last_name": "Martin" },
///   "membership": { "type": "mensuel", "end_date": "2024-12-31" }
/// }
/// ```
///
/// Denied:
/// ```json
/// { "allowed": false, "reason": "membership_expired" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanResponse {
    pub allowed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<MemberSummary>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub membership: Option<MembershipSummary>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenialReason>,
}

impl ScanResponse {
    pub fn granted(member: MemberSummary, membership: MembershipSummary) -> Self {
        Self {
            allowed: true,
            member: Some(member),
            membership: Some(membership),
            reason: None,
        }
    }

    pub fn denied(reason: DenialReason) -> Self {
        Self {
            allowed: false,
            member: None,
            membership: None,
            reason: Some(reason),
        }
    }
}

/// Scan event to append to the audit log.
///
/// `member_id` is `None` only when the QR token did not resolve to a member.
/// `reason` is set exactly when `status` is `Denied`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScanEvent {
    pub device_id: Uuid,
    pub gym_area_id: Uuid,
    pub member_id: Option<Uuid>,
    pub scan_time: DateTime<Utc>,
    pub status: ScanStatus,
    pub reason: Option<DenialReason>,
}

impl NewScanEvent {
    pub fn allowed(
        device_id: Uuid,
        gym_area_id: Uuid,
        member_id: Uuid,
        scan_time: DateTime<Utc>,
    ) -> Self {
        Self {
            device_id,
            gym_area_id,
            member_id: Some(member_id),
            scan_time,
            status: ScanStatus::Allowed,
            reason: None,
        }
    }

    pub fn denied(
        device_id: Uuid,
        gym_area_id: Uuid,
        member_id: Option<Uuid>,
        scan_time: DateTime<Utc>,
        reason: DenialReason,
    ) -> Self {
        Self {
            device_id,
            gym_area_id,
            member_id,
            scan_time,
            status: ScanStatus::Denied,
            reason: Some(reason),
        }
    }
}
