//! Membership Handlers
//!
//! Join requests and member-targeting actions. Everything that touches an
//! existing member or a pending request is gated through the access control
//! engine in `permissions::access`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;
use validator::Validate;

use super::queries;
use super::types::{
    BanMemberRequest, HandleJoinRequest, JoinClubRequest, JoinRequestsResponse, KickMemberRequest,
};
use crate::api::AppState;
use crate::club::types::Decision;
use crate::pagination::Filters;
use crate::permissions::{
    can_act_on_member, can_handle_membership_request, AccessError, ClubPermissions,
};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug)]
pub enum MembershipError {
    ClubNotFound,
    RequestNotFound,
    MemberNotFound,
    AlreadyRequested,
    AlreadyMember,
    Banned,
    /// The access check itself failed (not a member, outranked, storage).
    Access(AccessError),
    /// The access check ran and came back negative.
    NotAuthorized,
    Validation(String),
    Database(sqlx::Error),
}

impl IntoResponse for MembershipError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::ClubNotFound => (
                StatusCode::NOT_FOUND,
                "CLUB_NOT_FOUND",
                "Club not found".to_string(),
            ),
            Self::RequestNotFound => (
                StatusCode::NOT_FOUND,
                "JOIN_REQUEST_NOT_FOUND",
                "Join request not found".to_string(),
            ),
            Self::MemberNotFound => (
                StatusCode::NOT_FOUND,
                "MEMBER_NOT_FOUND",
                "User is not a member of this club".to_string(),
            ),
            Self::AlreadyRequested => (
                StatusCode::CONFLICT,
                "ALREADY_REQUESTED",
                "A join request for this user already exists".to_string(),
            ),
            Self::AlreadyMember => (
                StatusCode::CONFLICT,
                "ALREADY_MEMBER",
                "User is already a member of this club".to_string(),
            ),
            Self::Banned => (
                StatusCode::FORBIDDEN,
                "BANNED",
                "User is banned from this club".to_string(),
            ),
            Self::Access(err) => return access_error_response(err),
            Self::NotAuthorized => (
                StatusCode::FORBIDDEN,
                "PERMISSION_DENIED",
                "User does not have permission".to_string(),
            ),
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            Self::Database(err) => {
                tracing::error!(%err, "Membership endpoint database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Database error".to_string(),
                )
            }
        };
        (
            status,
            Json(serde_json::json!({ "error": code, "message": message })),
        )
            .into_response()
    }
}

/// Map access check failures to HTTP.
///
/// Actor- and target-side membership failures are distinct signals: an
/// unknown actor is a denial, an unknown target is a not-found. A negative
/// decision never reaches here; that is `NotAuthorized`.
fn access_error_response(err: &AccessError) -> Response {
    let (status, code, message) = match err {
        AccessError::ActorNotClubMember => (
            StatusCode::FORBIDDEN,
            "ACTOR_NOT_MEMBER",
            err.to_string(),
        ),
        AccessError::TargetNotClubMember => (
            StatusCode::NOT_FOUND,
            "TARGET_NOT_MEMBER",
            err.to_string(),
        ),
        AccessError::InsufficientRolePosition { .. } => (
            StatusCode::FORBIDDEN,
            "INSUFFICIENT_ROLE_POSITION",
            err.to_string(),
        ),
        AccessError::EmptyRoleSet => {
            tracing::error!(%err, "Membership data integrity violation");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal error".to_string(),
            )
        }
        AccessError::Database(db_err) => {
            tracing::error!(%db_err, "Access check database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Database error".to_string(),
            )
        }
    };
    (
        status,
        Json(serde_json::json!({ "error": code, "message": message })),
    )
        .into_response()
}

impl From<sqlx::Error> for MembershipError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err)
    }
}

impl From<AccessError> for MembershipError {
    fn from(err: AccessError) -> Self {
        Self::Access(err)
    }
}

fn pg_error_code(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) => db.code().map(|c| c.to_string()),
        _ => None,
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// File a join request for a club.
#[tracing::instrument(skip(state))]
pub async fn request_to_join(
    State(state): State<AppState>,
    Path(club_id): Path<Uuid>,
    Json(body): Json<JoinClubRequest>,
) -> Result<StatusCode, MembershipError> {
    if queries::is_banned(&state.db, club_id, body.user_id).await? {
        return Err(MembershipError::Banned);
    }
    if queries::is_member(&state.db, club_id, body.user_id).await? {
        return Err(MembershipError::AlreadyMember);
    }

    queries::insert_join_request(&state.db, club_id, body.user_id)
        .await
        .map_err(|e| match pg_error_code(&e).as_deref() {
            // unique_violation: a request is already pending
            Some("23505") => MembershipError::AlreadyRequested,
            // foreign_key_violation: unknown club or user
            Some("23503") => MembershipError::ClubNotFound,
            _ => MembershipError::Database(e),
        })?;

    Ok(StatusCode::CREATED)
}

/// Approve or reject a pending join request.
#[tracing::instrument(skip(state))]
pub async fn handle_join_request(
    State(state): State<AppState>,
    Path((club_id, user_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<HandleJoinRequest>,
) -> Result<StatusCode, MembershipError> {
    let authorized = can_handle_membership_request(&state.db, club_id, body.actor_id).await?;
    if !authorized {
        return Err(MembershipError::NotAuthorized);
    }

    let handled = match body.action {
        Decision::Approve => queries::approve_membership(&state.db, club_id, user_id).await?,
        Decision::Reject => queries::delete_join_request(&state.db, club_id, user_id).await?,
    };
    if !handled {
        return Err(MembershipError::RequestNotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}

/// List pending join requests for a club.
#[tracing::instrument(skip(state))]
pub async fn list_join_requests(
    State(state): State<AppState>,
    Path(club_id): Path<Uuid>,
    Query(filters): Query<Filters>,
) -> Result<Json<JoinRequestsResponse>, MembershipError> {
    filters
        .validate()
        .map_err(|e| MembershipError::Validation(e.to_string()))?;

    let (users, metadata) = queries::list_join_requests(&state.db, club_id, filters).await?;

    Ok(Json(JoinRequestsResponse { users, metadata }))
}

/// Kick a member from the club.
#[tracing::instrument(skip(state))]
pub async fn kick_member(
    State(state): State<AppState>,
    Path((club_id, user_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<KickMemberRequest>,
) -> Result<StatusCode, MembershipError> {
    if body.actor_id == user_id {
        return Err(MembershipError::Validation(
            "Cannot kick yourself from the club".to_string(),
        ));
    }

    let authorized = can_act_on_member(
        &state.db,
        club_id,
        body.actor_id,
        user_id,
        ClubPermissions::KICK_MEMBER,
    )
    .await?;
    if !authorized {
        return Err(MembershipError::NotAuthorized);
    }

    if !queries::remove_member(&state.db, club_id, user_id).await? {
        return Err(MembershipError::MemberNotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Ban a member from the club.
#[tracing::instrument(skip(state, body))]
pub async fn ban_member(
    State(state): State<AppState>,
    Path(club_id): Path<Uuid>,
    Json(body): Json<BanMemberRequest>,
) -> Result<StatusCode, MembershipError> {
    if body.actor_id == body.user_id {
        return Err(MembershipError::Validation(
            "Cannot ban yourself from the club".to_string(),
        ));
    }

    let authorized = can_act_on_member(
        &state.db,
        club_id,
        body.actor_id,
        body.user_id,
        ClubPermissions::BAN_MEMBER,
    )
    .await?;
    if !authorized {
        return Err(MembershipError::NotAuthorized);
    }

    let banned = queries::ban_member(
        &state.db,
        club_id,
        body.user_id,
        body.actor_id,
        body.reason.as_deref(),
    )
    .await?;
    if !banned {
        return Err(MembershipError::MemberNotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}
