//! User Replica Types
//!
//! Users are owned by the upstream user service; this service keeps a local
//! replica maintained exclusively by the lifecycle event consumer.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Local replica of an upstream user record.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub barcode: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Payload of a `user.created` event.
#[derive(Debug, Deserialize)]
pub struct UserCreated {
    pub id: Uuid,
    pub email: String,
    pub barcode: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Payload of a `user.updated` event. Absent fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct UserUpdated {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
}
