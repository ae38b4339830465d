//! PostgreSQL-backed membership store.
//!
//! Each method runs its statements directly against the pool. Reads for one
//! scan are not wrapped in a transaction: concurrent scans may observe
//! slightly different membership state, which admission control tolerates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{MembershipStore, StoreError};
use crate::db::DbPool;
use crate::models::{
    device::ScanDevice,
    member::{Member, MemberWithMemberships, Membership},
    scan::NewScanEvent,
};

#[derive(Debug, Clone)]
pub struct PgMembershipStore {
    pool: DbPool,
}

impl PgMembershipStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipStore for PgMembershipStore {
    async fn find_device_by_api_key(&self, api_key: &str) -> Result<Option<ScanDevice>, StoreError> {
        // Inner joins: a device whose area or gym is gone does not authenticate
        let device = sqlx::query_as::<_, ScanDevice>(
            r#"
            SELECT d.id, d.name, d.gym_area_id, d.last_seen_at,
                   a.name AS area_name, g.name AS gym_name
            FROM scan_devices d
            JOIN gym_areas a ON a.id = d.gym_area_id
            JOIN gyms g ON g.id = a.gym_id
            WHERE d.api_key = $1
            "#,
        )
        .bind(api_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(device)
    }

    async fn update_device_last_seen(
        &self,
        device_id: Uuid,
        seen_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE scan_devices SET last_seen_at = $1 WHERE id = $2")
            .bind(seen_at)
            .bind(device_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_member_with_memberships(
        &self,
        member_id: Uuid,
    ) -> Result<Option<MemberWithMemberships>, StoreError> {
        let Some(member) = sqlx::query_as::<_, Member>(
            "SELECT id, first_name, last_name FROM members WHERE id = $1",
        )
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        // Ordering here is cosmetic; selection happens in MemberWithMemberships
        let memberships = sqlx::query_as::<_, Membership>(
            r#"
            SELECT id, type, start_date, end_date
            FROM memberships
            WHERE member_id = $1
            ORDER BY end_date DESC, id ASC
            "#,
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(MemberWithMemberships {
            member,
            memberships,
        }))
    }

    async fn insert_scan_event(&self, event: &NewScanEvent) -> Result<Uuid, StoreError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO scans (device_id, gym_area_id, member_id, scan_time, status, reason)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(event.device_id)
        .bind(event.gym_area_id)
        .bind(event.member_id)
        .bind(event.scan_time)
        .bind(event.status.as_str())
        .bind(event.reason.map(|r| r.as_str()))
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
