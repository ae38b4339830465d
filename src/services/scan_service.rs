//! Scan service - decides whether a scanned member may enter.
//!
//! # Decision Flow
//!
//! Runs after the request body has been validated, strictly in this order:
//!
//! 1. Credential present, else `UnauthorizedDevice` (401)
//! 2. Credential resolves to a device, else `InvalidDevice` (401)
//! 3. Body `device_id` names that device, else `DeviceMismatch` (403)
//! 4. Refresh the device's last-seen timestamp (failure is logged, not fatal)
//! 5. QR token resolves to a member, else log + deny `member_not_found`
//! 6. Member holds a membership active today, else log + deny
//!    `membership_expired`
//! 7. Log + grant
//!
//! Steps 1-3 never touch the scan log: the caller's identity is not trusted
//! yet. Steps 5-7 always append exactly one row.

use chrono::{DateTime, Local, NaiveDate, Utc};

use crate::{
    error::AppError,
    models::{
        member::{MemberSummary, MembershipSummary},
        scan::{DenialReason, NewScanEvent, ScanResponse, ValidatedScan},
    },
    store::MembershipStore,
};

/// Point in time a scan is evaluated at.
///
/// Captured once per request so every step sees the same "today".
#[derive(Debug, Clone, Copy)]
pub struct ScanClock {
    /// Server-local calendar day used for membership validity
    pub today: NaiveDate,

    /// Server time used for last-seen and as the default scan time
    pub now: DateTime<Utc>,
}

impl ScanClock {
    pub fn system() -> Self {
        Self {
            today: Local::now().date_naive(),
            now: Utc::now(),
        }
    }
}

/// Authorize one scan.
///
/// # Arguments
///
/// * `store` - Membership store
/// * `api_key` - Device credential from the request header, if any
/// * `scan` - Validated request body
/// * `clock` - Evaluation time
///
/// # Returns
///
/// `Ok` for both granted and business-denied outcomes; the response's
/// `allowed` flag tells them apart.
///
/// # Errors
///
/// - `UnauthorizedDevice`, `InvalidDevice`, `DeviceMismatch`: caller rejected
/// - `Store`: any store failure other than the last-seen update
pub async fn authorize_scan(
    store: &dyn MembershipStore,
    api_key: Option<&str>,
    scan: &ValidatedScan,
    clock: ScanClock,
) -> Result<ScanResponse, AppError> {
    let api_key = api_key.ok_or(AppError::UnauthorizedDevice)?;

    let device = store
        .find_device_by_api_key(api_key)
        .await?
        .ok_or(AppError::InvalidDevice)?;

    tracing::debug!(
        device_id = %device.id,
        device = %device.name,
        last_seen_at = ?device.last_seen_at,
        "Device authenticated"
    );

    if !scan.claims_device(device.id) {
        tracing::warn!(
            device_id = %device.id,
            claimed_device_id = %scan.device_id,
            "Device id does not match credential"
        );
        return Err(AppError::DeviceMismatch);
    }

    if let Err(e) = store.update_device_last_seen(device.id, clock.now).await {
        tracing::warn!(device_id = %device.id, error = %e, "Failed to update device last_seen_at");
    }

    let scan_time = scan.scanned_at.unwrap_or(clock.now);

    // A token that is not a member id cannot match any member
    let member = match scan.member_id() {
        Some(member_id) => store.find_member_with_memberships(member_id).await?,
        None => None,
    };

    let Some(member) = member else {
        let event = NewScanEvent::denied(
            device.id,
            device.gym_area_id,
            None,
            scan_time,
            DenialReason::MemberNotFound,
        );
        store.insert_scan_event(&event).await?;

        tracing::info!(
            device_id = %device.id,
            qr_token = %scan.qr_token,
            "Scan denied: member not found"
        );
        return Ok(ScanResponse::denied(DenialReason::MemberNotFound));
    };

    let member_id = member.member.id;

    let Some(membership) = member.active_membership(clock.today) else {
        let event = NewScanEvent::denied(
            device.id,
            device.gym_area_id,
            Some(member_id),
            scan_time,
            DenialReason::MembershipExpired,
        );
        store.insert_scan_event(&event).await?;

        tracing::info!(
            device_id = %device.id,
            member_id = %member_id,
            "Scan denied: no active membership"
        );
        return Ok(ScanResponse::denied(DenialReason::MembershipExpired));
    };

    let event = NewScanEvent::allowed(device.id, device.gym_area_id, member_id, scan_time);
    let scan_id = store.insert_scan_event(&event).await?;

    tracing::info!(
        scan_id = %scan_id,
        device_id = %device.id,
        gym = %device.gym_name,
        area = %device.area_name,
        member_id = %member_id,
        membership_id = %membership.id,
        "Scan allowed"
    );

    Ok(ScanResponse::granted(
        MemberSummary::from(&member.member),
        MembershipSummary::from(membership),
    ))
}
