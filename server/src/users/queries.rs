//! Database queries for the user replica.

use sqlx::PgPool;
use uuid::Uuid;

use super::types::{User, UserCreated};

/// Insert a user replica row.
///
/// A duplicate id or email surfaces as a unique-violation database error;
/// the event consumer decides how to report it.
pub async fn insert_user(pool: &PgPool, user: &UserCreated) -> sqlx::Result<()> {
    sqlx::query(
        r"
        INSERT INTO users (id, email, barcode, first_name, last_name, avatar_url)
        VALUES ($1, $2, $3, $4, $5, $6)
        ",
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(&user.barcode)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.avatar_url)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get a user replica by id.
pub async fn get_user_by_id(pool: &PgPool, user_id: Uuid) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(
        r"
        SELECT id, email, barcode, first_name, last_name, avatar_url, created_at
        FROM users
        WHERE id = $1
        ",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Partially update a user replica.
///
/// Uses COALESCE to only touch provided fields. Returns `false` when no such
/// user exists.
pub async fn update_user(
    pool: &PgPool,
    user_id: Uuid,
    first_name: Option<&str>,
    last_name: Option<&str>,
    avatar_url: Option<&str>,
) -> sqlx::Result<bool> {
    let result = sqlx::query(
        r"
        UPDATE users
        SET first_name = COALESCE($2, first_name),
            last_name = COALESCE($3, last_name),
            avatar_url = COALESCE($4, avatar_url)
        WHERE id = $1
        ",
    )
    .bind(user_id)
    .bind(first_name)
    .bind(last_name)
    .bind(avatar_url)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a user replica. Returns `false` when no such user exists.
pub async fn delete_user(pool: &PgPool, user_id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
