//! Member and membership models.
//!
//! A member's id doubles as the QR token printed on their card. Memberships
//! are date ranges; a member may hold any number of them (historical,
//! current, renewed in advance).

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

/// Represents a member record from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Member {
    /// Unique identifier, also the value encoded in the member's QR code
    pub id: Uuid,

    pub first_name: String,

    pub last_name: String,
}

/// Represents a membership record from the database.
///
/// # Validity
///
/// Both bounds are inclusive and compared at day granularity: a membership
/// ending on 2024-12-31 still admits its member for the whole of that day.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Membership {
    pub id: Uuid,

    /// Plan label (e.g. "mensuel", "annuel")
    #[sqlx(rename = "type")]
    pub membership_type: String,

    pub start_date: NaiveDate,

    pub end_date: NaiveDate,
}

impl Membership {
    /// Whether `today` falls within `[start_date, end_date]`.
    pub fn is_active_on(&self, today: NaiveDate) -> bool {
        self.start_date <= today && today <= self.end_date
    }
}

/// A member together with all of their memberships.
#[derive(Debug, Clone)]
pub struct MemberWithMemberships {
    pub member: Member,
    pub memberships: Vec<Membership>,
}

impl MemberWithMemberships {
    /// Select the membership that authorizes entry on `today`.
    ///
    /// Among memberships active on `today`, the one with the latest end date
    /// wins. When several share that end date, the lowest membership id wins.
    pub fn active_membership(&self, today: NaiveDate) -> Option<&Membership> {
        self.memberships
            .iter()
            .filter(|m| m.is_active_on(today))
            .min_by(|a, b| b.end_date.cmp(&a.end_date).then_with(|| a.id.cmp(&b.id)))
    }
}

/// Member details returned to the device on a granted scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberSummary {
    pub first_name: String,
    pub last_name: String,
}

impl From<&Member> for MemberSummary {
    fn from(member: &Member) -> Self {
        Self {
            first_name: member.first_name.clone(),
            last_name: member.last_name.clone(),
        }
    }
}

/// Membership details returned to the device on a granted scan.
///
/// `end_date` serializes as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MembershipSummary {
    #[serde(rename = "type")]
    pub membership_type: String,

    pub end_date: NaiveDate,
}

impl From<&Membership> for MembershipSummary {
    fn from(membership: &Membership) -> Self {
        Self {
            membership_type: membership.membership_type.clone(),
            end_date: membership.end_date,
        }
    }
}
