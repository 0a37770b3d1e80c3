//! Membership Type Definitions

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::club::types::Decision;
use crate::pagination::Metadata;
use crate::users::User;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct JoinClubRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct HandleJoinRequest {
    /// The member making the approve/reject decision.
    pub actor_id: Uuid,
    pub action: Decision,
}

#[derive(Debug, Deserialize)]
pub struct KickMemberRequest {
    pub actor_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct BanMemberRequest {
    pub actor_id: Uuid,
    pub user_id: Uuid,
    pub reason: Option<String>,
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct JoinRequestsResponse {
    pub users: Vec<User>,
    pub metadata: Metadata,
}
