//! Database models for the permission system.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::club::ClubPermissions;

/// Club role with permissions.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClubRole {
    pub id: Uuid,
    pub club_id: Uuid,
    pub name: String,
    pub color: Option<String>,
    #[sqlx(try_from = "i64")]
    pub permissions: ClubPermissions,
    pub position: i32,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A member's role set in one club, plus the out-of-band owner flag.
///
/// Ownership is not a role: it is computed from `clubs.owner_id` and
/// overrides every role-based check.
#[derive(Debug, Clone)]
pub struct MemberRoles {
    pub roles: Vec<ClubRole>,
    pub is_owner: bool,
}

// Implement From for ClubPermissions to work with sqlx
impl From<i64> for ClubPermissions {
    fn from(value: i64) -> Self {
        Self::from_db(value)
    }
}
