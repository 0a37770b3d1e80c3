//! Join requests and member-targeting actions.

pub mod handlers;
pub mod queries;
pub mod types;

use axum::routing::{delete, get, post};
use axum::Router;

use crate::api::AppState;

/// Membership routes, nested under `/api/clubs`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{club_id}/join", post(handlers::request_to_join))
        .route("/{club_id}/join-requests", get(handlers::list_join_requests))
        .route(
            "/{club_id}/join-requests/{user_id}/decision",
            post(handlers::handle_join_request),
        )
        .route("/{club_id}/members/{user_id}", delete(handlers::kick_member))
        .route("/{club_id}/bans", post(handlers::ban_member))
}
