//! User lifecycle event consumer.
//!
//! The user service publishes create/update/delete events for activated
//! users on Redis pub/sub; this consumer keeps the local replica in sync.
//! Events are JSON payloads on fixed channels.

use fred::prelude::*;
use sqlx::PgPool;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::queries;
use super::types::{UserCreated, UserUpdated};
use crate::api::AppState;

/// Pub/sub channels published by the user service.
pub mod channels {
    pub const USER_CREATED: &str = "user.created";
    pub const USER_UPDATED: &str = "user.updated";
    pub const USER_DELETED: &str = "user.deleted";
}

/// Errors while applying a single user event.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("invalid event payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("user already exists")]
    UserExists,

    #[error("user does not exist")]
    UserNotExists,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Consume user lifecycle events until the subscriber connection closes.
///
/// Intended to be spawned once at startup. A malformed or failing event is
/// logged and skipped; the stream keeps going.
pub async fn run(state: AppState) {
    // Pub/sub needs its own connection; clone_new shares the config only.
    let subscriber = state.redis.clone_new();
    let _connect_handle = subscriber.connect();

    if let Err(e) = subscriber.wait_for_connect().await {
        error!("User event subscriber connection failed: {}", e);
        return;
    }

    let mut events = subscriber.message_rx();

    if let Err(e) = subscriber
        .subscribe(vec![
            channels::USER_CREATED,
            channels::USER_UPDATED,
            channels::USER_DELETED,
        ])
        .await
    {
        error!("Failed to subscribe to user events: {}", e);
        return;
    }

    info!("User event consumer started");

    while let Ok(message) = events.recv().await {
        let channel = message.channel.to_string();
        let Some(payload) = message.value.as_str() else {
            warn!(%channel, "Ignoring non-text user event payload");
            continue;
        };

        let result = match channel.as_str() {
            channels::USER_CREATED => handle_created(&state.db, &payload).await,
            channels::USER_UPDATED => handle_updated(&state.db, &payload).await,
            channels::USER_DELETED => handle_deleted(&state.db, &payload).await,
            _ => continue,
        };

        if let Err(e) = result {
            error!(%channel, "Failed to apply user event: {}", e);
        }
    }

    warn!("User event consumer stopped");
}

async fn handle_created(db: &PgPool, payload: &str) -> Result<(), EventError> {
    let input: UserCreated = serde_json::from_str(payload)?;

    queries::insert_user(db, &input).await.map_err(|e| {
        if is_unique_violation(&e) {
            EventError::UserExists
        } else {
            EventError::Database(e)
        }
    })?;

    info!(user_id = %input.id, "User replica created");
    Ok(())
}

async fn handle_updated(db: &PgPool, payload: &str) -> Result<(), EventError> {
    let input: UserUpdated = serde_json::from_str(payload)?;

    let updated = queries::update_user(
        db,
        input.id,
        input.first_name.as_deref(),
        input.last_name.as_deref(),
        input.avatar_url.as_deref(),
    )
    .await?;
    if !updated {
        return Err(EventError::UserNotExists);
    }

    info!(user_id = %input.id, "User replica updated");
    Ok(())
}

async fn handle_deleted(db: &PgPool, payload: &str) -> Result<(), EventError> {
    // The delete payload is the bare user id.
    let user_id: Uuid = serde_json::from_str(payload)?;

    let deleted = queries::delete_user(db, user_id).await?;
    if !deleted {
        return Err(EventError::UserNotExists);
    }

    info!(%user_id, "User replica deleted");
    Ok(())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_payload_deserializes() {
        let payload = r#"{
            "id": "01890a5d-ac96-774b-bcce-b302099a8057",
            "email": "ada@example.edu",
            "barcode": "210107077",
            "first_name": "Ada",
            "last_name": "Lovelace"
        }"#;
        let input: UserCreated = serde_json::from_str(payload).unwrap();
        assert_eq!(input.email, "ada@example.edu");
        assert!(input.avatar_url.is_none());
    }

    #[test]
    fn test_updated_payload_allows_partial_fields() {
        let payload = r#"{
            "id": "01890a5d-ac96-774b-bcce-b302099a8057",
            "avatar_url": "https://cdn.example.edu/a.png"
        }"#;
        let input: UserUpdated = serde_json::from_str(payload).unwrap();
        assert!(input.first_name.is_none());
        assert_eq!(
            input.avatar_url.as_deref(),
            Some("https://cdn.example.edu/a.png")
        );
    }

    #[test]
    fn test_deleted_payload_is_a_bare_id() {
        let payload = r#""01890a5d-ac96-774b-bcce-b302099a8057""#;
        let user_id: Uuid = serde_json::from_str(payload).unwrap();
        assert_eq!(
            user_id.to_string(),
            "01890a5d-ac96-774b-bcce-b302099a8057"
        );
    }
}
