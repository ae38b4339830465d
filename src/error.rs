//! Error types and HTTP error response handling.
//!
//! Every error leaving the scan endpoint is rendered in the same shape as a
//! business denial, so devices only ever parse one response format:
//!
//! ```json
//! { "allowed": false, "reason": "invalid_device" }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::models::scan::{DenialReason, ScanResponse};
use crate::store::StoreError;

/// Application-wide error type.
///
/// # Error Categories
///
/// - **Client request errors**: malformed payload, missing or unknown
///   credential, device/body mismatch. Surfaced as 4xx and never written to
///   the scan log.
/// - **Infrastructure faults**: store unreachable, query failure, pool
///   timeout. Surfaced as 500 `internal_error`; the cause is logged, not
///   returned.
///
/// Business denials (unknown member, expired membership) are not errors and
/// do not appear here.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// `qr_token` or `device_id` absent, empty, or body not parseable.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Missing required fields")]
    MissingRequiredFields,

    /// No device credential header on the request.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Missing device credential")]
    UnauthorizedDevice,

    /// Credential does not match any registered device.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Unknown device credential")]
    InvalidDevice,

    /// Credential belongs to a different device than the body's `device_id`.
    ///
    /// Returns HTTP 403 Forbidden.
    #[error("Device id does not match credential")]
    DeviceMismatch,

    /// Membership store failure.
    ///
    /// Returns HTTP 500 Internal Server Error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl AppError {
    /// HTTP status and reason code for this error.
    pub fn status_and_reason(&self) -> (StatusCode, DenialReason) {
        match self {
            AppError::MissingRequiredFields => {
                (StatusCode::BAD_REQUEST, DenialReason::MissingRequiredFields)
            }
            AppError::UnauthorizedDevice => {
                (StatusCode::UNAUTHORIZED, DenialReason::UnauthorizedDevice)
            }
            AppError::InvalidDevice => (StatusCode::UNAUTHORIZED, DenialReason::InvalidDevice),
            AppError::DeviceMismatch => (StatusCode::FORBIDDEN, DenialReason::DeviceMismatch),
            AppError::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                DenialReason::InternalError,
            ),
        }
    }
}

/// Convert AppError into an HTTP response.
///
/// # Status Code Mapping
///
/// - `MissingRequiredFields` → 400 Bad Request
/// - `UnauthorizedDevice` → 401 Unauthorized
/// - `InvalidDevice` → 401 Unauthorized
/// - `DeviceMismatch` → 403 Forbidden
/// - `Store` → 500 Internal Server Error (details logged only)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, reason) = self.status_and_reason();

        if status.is_server_error() {
            tracing::error!(error = %self, "Error processing scan");
        } else {
            tracing::debug!(%reason, "Scan request rejected");
        }

        (status, Json(ScanResponse::denied(reason))).into_response()
    }
}
