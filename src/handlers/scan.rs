//! Scan HTTP handler.
//!
//! This module implements the endpoint called by QR scan devices:
//! - POST /api/scan - Decide whether a scanned member may enter

use axum::{Json, body::Bytes, extract::State};

use crate::{
    error::AppError,
    middleware::auth::DeviceCredential,
    models::scan::{ScanRequest, ScanResponse},
    services::scan_service::{self, ScanClock},
    state::AppState,
};

/// Authorize a QR scan.
///
/// # Endpoint
///
/// `POST /api/scan`
///
/// # Authentication
///
/// Requires the device API key in the `x-api-key` header. The key is only
/// checked once the body has been validated.
///
/// The body is parsed as JSON whatever the `Content-Type`; scanner firmware
/// does not reliably send one.
///
/// # Request Body
///
/// ```json
/// {
///   "qr_token": "8f14e45f-ceea-467f-a8f6-1b0b8a3c2d11",
///   "device_id": "550e8400-e29b-41d4-a716-446655440000",
///   "scanned_at": "2024-06-15T08:30:00Z"
/// }
/// ```
///
/// # Response
///
/// - **200 OK**: granted or denied (`member_not_found`, `membership_expired`)
/// - **400**: `missing_required_fields`
/// - **401**: `unauthorized_device` / `invalid_device`
/// - **403**: `device_mismatch`
/// - **500**: `internal_error`
pub async fn scan(
    State(state): State<AppState>,
    credential: DeviceCredential,
    body: Bytes,
) -> Result<Json<ScanResponse>, AppError> {
    let request = serde_json::from_slice::<ScanRequest>(&body).map_err(|e| {
        tracing::debug!(error = %e, "Malformed scan payload");
        AppError::MissingRequiredFields
    })?;
    let scan = request.validate()?;

    let response = scan_service::authorize_scan(
        state.store.as_ref(),
        credential.as_deref(),
        &scan,
        ScanClock::system(),
    )
    .await?;

    Ok(Json(response))
}
