//! Club management: creation, approval workflow, and listing.

pub mod handlers;
pub mod queries;
pub mod types;

use axum::routing::{get, post};
use axum::Router;

use crate::api::AppState;

/// Club routes, nested under `/api/clubs`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_club).get(handlers::list_clubs))
        .route("/pending", get(handlers::list_pending_clubs))
        .route("/{club_id}", get(handlers::get_club))
        .route("/{club_id}/decision", post(handlers::decide_club))
        .route("/{club_id}/members", get(handlers::list_members))
        .route("/{club_id}/roles", get(handlers::list_roles))
}
