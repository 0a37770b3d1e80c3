//! Club Management Handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;
use validator::Validate;

use super::queries;
use super::types::{
    Club, ClubMembersResponse, ClubWithMemberCount, CreateClubRequest, Decision,
    HandleClubRequest, ListClubsQuery, ListClubsResponse, PendingClubsResponse, RoleResponse,
};
use crate::api::AppState;
use crate::pagination::Filters;
use crate::permissions;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug)]
pub enum ClubError {
    NotFound,
    Validation(String),
    Database(sqlx::Error),
}

impl IntoResponse for ClubError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::NotFound => (
                StatusCode::NOT_FOUND,
                "CLUB_NOT_FOUND",
                "Club not found".to_string(),
            ),
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            Self::Database(err) => {
                tracing::error!(%err, "Club endpoint database error");
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

impl From<sqlx::Error> for ClubError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err)
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Submit a new club for approval.
#[tracing::instrument(skip(state, body))]
pub async fn create_club(
    State(state): State<AppState>,
    Json(body): Json<CreateClubRequest>,
) -> Result<(StatusCode, Json<Club>), ClubError> {
    body.validate()
        .map_err(|e| ClubError::Validation(e.to_string()))?;

    let club = queries::create_club(
        &state.db,
        body.owner_id,
        &body.name,
        body.description.as_deref(),
        &body.club_type,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(club)))
}

/// Approve or reject a pending club.
#[tracing::instrument(skip(state))]
pub async fn decide_club(
    State(state): State<AppState>,
    Path(club_id): Path<Uuid>,
    Json(body): Json<HandleClubRequest>,
) -> Result<StatusCode, ClubError> {
    let handled = match body.action {
        Decision::Approve => queries::approve_club(&state.db, club_id).await?,
        Decision::Reject => queries::reject_club(&state.db, club_id).await?,
    };
    if !handled {
        // Unknown club, or the decision already happened.
        return Err(ClubError::NotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Get an approved club with its member count.
#[tracing::instrument(skip(state))]
pub async fn get_club(
    State(state): State<AppState>,
    Path(club_id): Path<Uuid>,
) -> Result<Json<ClubWithMemberCount>, ClubError> {
    let club = queries::get_club_by_id(&state.db, club_id)
        .await?
        .ok_or(ClubError::NotFound)?;

    Ok(Json(club))
}

/// List approved clubs with search, type filter and pagination.
#[tracing::instrument(skip(state))]
pub async fn list_clubs(
    State(state): State<AppState>,
    Query(query): Query<ListClubsQuery>,
) -> Result<Json<ListClubsResponse>, ClubError> {
    let filters = query.filters();
    filters
        .validate()
        .map_err(|e| ClubError::Validation(e.to_string()))?;

    let (clubs, metadata) =
        queries::list_clubs(&state.db, &query.query, query.club_types(), filters).await?;

    Ok(Json(ListClubsResponse { clubs, metadata }))
}

/// List clubs awaiting approval, with their requesting users.
#[tracing::instrument(skip(state))]
pub async fn list_pending_clubs(
    State(state): State<AppState>,
    Query(query): Query<ListClubsQuery>,
) -> Result<Json<PendingClubsResponse>, ClubError> {
    let filters = query.filters();
    filters
        .validate()
        .map_err(|e| ClubError::Validation(e.to_string()))?;

    let (clubs, metadata) =
        queries::list_pending_clubs(&state.db, &query.query, query.club_types(), filters).await?;

    Ok(Json(PendingClubsResponse { clubs, metadata }))
}

/// List the clubs a user belongs to.
#[tracing::instrument(skip(state))]
pub async fn get_user_clubs(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<ClubWithMemberCount>>, ClubError> {
    let clubs = queries::get_user_clubs(&state.db, user_id).await?;

    Ok(Json(clubs))
}

/// List club members with their role names.
#[tracing::instrument(skip(state))]
pub async fn list_members(
    State(state): State<AppState>,
    Path(club_id): Path<Uuid>,
    Query(filters): Query<Filters>,
) -> Result<Json<ClubMembersResponse>, ClubError> {
    filters
        .validate()
        .map_err(|e| ClubError::Validation(e.to_string()))?;

    let (members, metadata) = queries::list_club_members(&state.db, club_id, filters).await?;

    Ok(Json(ClubMembersResponse { members, metadata }))
}

/// List the roles of a club. Permission masks are decoded to names.
#[tracing::instrument(skip(state))]
pub async fn list_roles(
    State(state): State<AppState>,
    Path(club_id): Path<Uuid>,
) -> Result<Json<Vec<RoleResponse>>, ClubError> {
    let roles = permissions::get_club_roles(&state.db, club_id).await?;

    Ok(Json(roles.into_iter().map(RoleResponse::from).collect()))
}
