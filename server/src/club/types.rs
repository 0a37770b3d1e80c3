//! Club Type Definitions

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::pagination::Filters;
use crate::permissions::ClubRole;
use crate::users::User;

// ============================================================================
// Club Entity
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Club {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub club_type: String,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub owner_id: Uuid,
    pub approved: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Club with member count for read responses.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClubWithMemberCount {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub club: Club,
    /// Total number of members in the club.
    pub member_count: i64,
}

/// A club awaiting approval, paired with the user who requested it.
#[derive(Debug, Clone, Serialize)]
pub struct PendingClub {
    pub club: Club,
    pub requested_by: User,
}

/// Club member with the names of the roles they hold.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClubMember {
    pub id: Uuid,
    pub email: String,
    pub barcode: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: Option<String>,
    pub roles: Vec<String>,
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct CreateClubRequest {
    pub owner_id: Uuid,
    #[validate(length(min = 3, max = 250, message = "Name must be 3-250 characters"))]
    pub name: String,
    #[validate(length(max = 2500, message = "Description must be at most 2500 characters"))]
    pub description: Option<String>,
    #[validate(length(min = 3, max = 250, message = "Club type must be 3-250 characters"))]
    pub club_type: String,
}

/// Verdict on a pending club or join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

#[derive(Debug, Deserialize)]
pub struct HandleClubRequest {
    pub action: Decision,
}

/// Query string for club listing endpoints.
#[derive(Debug, Deserialize)]
pub struct ListClubsQuery {
    /// Substring searched in name and description.
    #[serde(default)]
    pub query: String,
    /// Comma-separated club types to include; absent means all.
    pub club_type: Option<String>,
    #[serde(default = "default_page")]
    pub page: i32,
    #[serde(default = "default_page_size")]
    pub page_size: i32,
}

const fn default_page() -> i32 {
    1
}

const fn default_page_size() -> i32 {
    20
}

impl ListClubsQuery {
    #[must_use]
    pub const fn filters(&self) -> Filters {
        Filters {
            page: self.page,
            page_size: self.page_size,
        }
    }

    /// Split the comma-separated type filter into a list, if present.
    #[must_use]
    pub fn club_types(&self) -> Option<Vec<String>> {
        self.club_type.as_ref().map(|s| {
            s.split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect()
        })
    }
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ListClubsResponse {
    pub clubs: Vec<ClubWithMemberCount>,
    pub metadata: crate::pagination::Metadata,
}

#[derive(Debug, Serialize)]
pub struct PendingClubsResponse {
    pub clubs: Vec<PendingClub>,
    pub metadata: crate::pagination::Metadata,
}

#[derive(Debug, Serialize)]
pub struct ClubMembersResponse {
    pub members: Vec<ClubMember>,
    pub metadata: crate::pagination::Metadata,
}

/// Club role response. Permissions go out as names, never as the raw mask.
#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub id: Uuid,
    pub club_id: Uuid,
    pub name: String,
    pub color: Option<String>,
    pub permissions: Vec<&'static str>,
    pub position: i32,
    pub is_default: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ClubRole> for RoleResponse {
    fn from(role: ClubRole) -> Self {
        Self {
            id: role.id,
            club_id: role.club_id,
            name: role.name,
            color: role.color,
            permissions: role.permissions.names(),
            position: role.position,
            is_default: role.is_default,
            created_at: role.created_at,
        }
    }
}
