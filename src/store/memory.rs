//! In-memory membership store for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::{MembershipStore, StoreError};
use crate::models::{
    device::ScanDevice,
    member::{Member, MemberWithMemberships, Membership},
    scan::NewScanEvent,
};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    devices: HashMap<String, ScanDevice>,
    members: HashMap<Uuid, MemberWithMemberships>,
    last_seen: Mutex<HashMap<Uuid, DateTime<Utc>>>,
    scans: Mutex<Vec<NewScanEvent>>,
    fail_last_seen: bool,
    fail_member_lookup: bool,
    fail_scan_insert: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, api_key: &str, device_id: Uuid, gym_area_id: Uuid) -> Self {
        self.devices.insert(
            api_key.to_string(),
            ScanDevice {
                id: device_id,
                name: "Front desk scanner".to_string(),
                gym_area_id,
                area_name: "Main Entrance".to_string(),
                gym_name: "Test Gym".to_string(),
                last_seen_at: None,
            },
        );
        self
    }

    pub fn with_member(mut self, member_id: Uuid, first_name: &str, last_name: &str) -> Self {
        self.members.insert(
            member_id,
            MemberWithMemberships {
                member: Member {
                    id: member_id,
                    first_name: first_name.to_string(),
                    last_name: last_name.to_string(),
                },
                memberships: Vec::new(),
            },
        );
        self
    }

    /// Attach a membership to a member added earlier with `with_member`.
    pub fn with_membership(
        mut self,
        member_id: Uuid,
        membership_id: Uuid,
        membership_type: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        let member = self
            .members
            .get_mut(&member_id)
            .expect("with_member must be called before with_membership");
        member.memberships.push(Membership {
            id: membership_id,
            membership_type: membership_type.to_string(),
            start_date,
            end_date,
        });
        self
    }

    pub fn failing_last_seen(mut self) -> Self {
        self.fail_last_seen = true;
        self
    }

    pub fn failing_member_lookup(mut self) -> Self {
        self.fail_member_lookup = true;
        self
    }

    pub fn failing_scan_insert(mut self) -> Self {
        self.fail_scan_insert = true;
        self
    }

    /// Scan events written so far, in insertion order.
    pub fn scans(&self) -> Vec<NewScanEvent> {
        self.scans.lock().unwrap().clone()
    }

    pub fn last_seen(&self, device_id: Uuid) -> Option<DateTime<Utc>> {
        self.last_seen.lock().unwrap().get(&device_id).copied()
    }
}

#[async_trait]
impl MembershipStore for InMemoryStore {
    async fn find_device_by_api_key(&self, api_key: &str) -> Result<Option<ScanDevice>, StoreError> {
        Ok(self.devices.get(api_key).cloned())
    }

    async fn update_device_last_seen(
        &self,
        device_id: Uuid,
        seen_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        if self.fail_last_seen {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        self.last_seen.lock().unwrap().insert(device_id, seen_at);
        Ok(())
    }

    async fn find_member_with_memberships(
        &self,
        member_id: Uuid,
    ) -> Result<Option<MemberWithMemberships>, StoreError> {
        if self.fail_member_lookup {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(self.members.get(&member_id).cloned())
    }

    async fn insert_scan_event(&self, event: &NewScanEvent) -> Result<Uuid, StoreError> {
        if self.fail_scan_insert {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        self.scans.lock().unwrap().push(event.clone());
        Ok(Uuid::new_v4())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
