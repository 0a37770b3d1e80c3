//! Database queries for join requests, membership and bans.

use sqlx::PgPool;
use uuid::Uuid;

use crate::pagination::{Filters, Metadata};
use crate::users::User;

/// Is the user currently a member of the club?
pub async fn is_member(pool: &PgPool, club_id: Uuid, user_id: Uuid) -> sqlx::Result<bool> {
    let result: (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM club_members WHERE club_id = $1 AND user_id = $2)",
    )
    .bind(club_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(result.0)
}

/// Is the user banned from the club?
pub async fn is_banned(pool: &PgPool, club_id: Uuid, user_id: Uuid) -> sqlx::Result<bool> {
    let result: (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM club_bans WHERE club_id = $1 AND user_id = $2)",
    )
    .bind(club_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(result.0)
}

/// Record a join request.
///
/// Constraint violations (duplicate request, unknown club or user) surface
/// as database errors for the handler to map.
pub async fn insert_join_request(pool: &PgPool, club_id: Uuid, user_id: Uuid) -> sqlx::Result<()> {
    sqlx::query("INSERT INTO join_club_requests (club_id, user_id) VALUES ($1, $2)")
        .bind(club_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Drop a join request. Returns `false` when no such request exists.
pub async fn delete_join_request(
    pool: &PgPool,
    club_id: Uuid,
    user_id: Uuid,
) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM join_club_requests WHERE club_id = $1 AND user_id = $2")
        .bind(club_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Turn a join request into a membership.
///
/// Transactionally consumes the request, inserts the membership row and
/// assigns the club's default role, keeping the every-member-has-a-role
/// invariant. Returns `false` when there was no pending request.
#[tracing::instrument(skip(pool))]
pub async fn approve_membership(pool: &PgPool, club_id: Uuid, user_id: Uuid) -> sqlx::Result<bool> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query("DELETE FROM join_club_requests WHERE club_id = $1 AND user_id = $2")
        .bind(club_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        return Ok(false);
    }

    sqlx::query("INSERT INTO club_members (club_id, user_id) VALUES ($1, $2)")
        .bind(club_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    // Default role must exist for an approved club; missing row is a
    // RowNotFound storage error, not a silent skip.
    let (default_role_id,): (Uuid,) =
        sqlx::query_as("SELECT id FROM club_roles WHERE club_id = $1 AND is_default = true")
            .bind(club_id)
            .fetch_one(&mut *tx)
            .await?;

    sqlx::query("INSERT INTO club_member_roles (club_id, user_id, role_id) VALUES ($1, $2, $3)")
        .bind(club_id)
        .bind(user_id)
        .bind(default_role_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(true)
}

/// Remove a member and their role assignments.
///
/// Returns `false` when the user was not a member.
#[tracing::instrument(skip(pool))]
pub async fn remove_member(pool: &PgPool, club_id: Uuid, user_id: Uuid) -> sqlx::Result<bool> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM club_member_roles WHERE club_id = $1 AND user_id = $2")
        .bind(club_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM club_members WHERE club_id = $1 AND user_id = $2")
        .bind(club_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        return Ok(false);
    }

    tx.commit().await?;

    Ok(true)
}

/// Ban a member: record the ban, then remove membership, role assignments
/// and any pending join request.
#[tracing::instrument(skip(pool, reason))]
pub async fn ban_member(
    pool: &PgPool,
    club_id: Uuid,
    user_id: Uuid,
    banned_by: Uuid,
    reason: Option<&str>,
) -> sqlx::Result<bool> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r"
        INSERT INTO club_bans (club_id, user_id, banned_by, reason)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (club_id, user_id) DO NOTHING
        ",
    )
    .bind(club_id)
    .bind(user_id)
    .bind(banned_by)
    .bind(reason)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM join_club_requests WHERE club_id = $1 AND user_id = $2")
        .bind(club_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM club_member_roles WHERE club_id = $1 AND user_id = $2")
        .bind(club_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM club_members WHERE club_id = $1 AND user_id = $2")
        .bind(club_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        return Ok(false);
    }

    tx.commit().await?;

    Ok(true)
}

#[derive(Debug, sqlx::FromRow)]
struct JoinRequestRow {
    total: i64,
    #[sqlx(flatten)]
    user: User,
}

/// List the users with a pending join request for the club.
#[tracing::instrument(skip(pool))]
pub async fn list_join_requests(
    pool: &PgPool,
    club_id: Uuid,
    filters: Filters,
) -> sqlx::Result<(Vec<User>, Metadata)> {
    let rows: Vec<JoinRequestRow> = sqlx::query_as(
        r"
        SELECT count(*) OVER() AS total,
               u.id, u.email, u.barcode, u.first_name, u.last_name, u.avatar_url,
               u.created_at
        FROM join_club_requests jcr
        INNER JOIN users u ON u.id = jcr.user_id
        WHERE jcr.club_id = $1
        ORDER BY jcr.created_at
        LIMIT $2 OFFSET $3
        ",
    )
    .bind(club_id)
    .bind(filters.limit())
    .bind(filters.offset())
    .fetch_all(pool)
    .await?;

    let total = rows.first().map_or(0, |row| row.total) as i32;
    let users = rows.into_iter().map(|row| row.user).collect();

    Ok((
        users,
        Metadata::calculate(total, filters.page, filters.page_size),
    ))
}
