//! Membership store: the persistence collaborator of the scan authorizer.
//!
//! The authorizer only ever talks to storage through [`MembershipStore`], so
//! the connection pool stays an implementation detail of [`postgres`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{device::ScanDevice, member::MemberWithMemberships, scan::NewScanEvent};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgMembershipStore;

/// Errors raised by a membership store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Reads and writes the scan authorizer needs.
///
/// Implementations must be safe to share across concurrent requests. No
/// operation spans a transaction with another.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Find the device whose API key equals `api_key`, joined with its area
    /// and gym.
    async fn find_device_by_api_key(&self, api_key: &str) -> Result<Option<ScanDevice>, StoreError>;

    /// Set the device's last-seen timestamp.
    async fn update_device_last_seen(
        &self,
        device_id: Uuid,
        seen_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Find a member and all of their memberships.
    async fn find_member_with_memberships(
        &self,
        member_id: Uuid,
    ) -> Result<Option<MemberWithMemberships>, StoreError>;

    /// Append one row to the scan log and return its id.
    async fn insert_scan_event(&self, event: &NewScanEvent) -> Result<Uuid, StoreError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}
