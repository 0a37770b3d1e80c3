//! Database queries for the permission system.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::club::ClubPermissions;
use super::models::{ClubRole, MemberRoles};

/// One row of the member-roles join: a role plus the computed owner flag.
#[derive(Debug, sqlx::FromRow)]
struct MemberRoleRow {
    is_owner: bool,
    id: Uuid,
    club_id: Uuid,
    name: String,
    color: Option<String>,
    #[sqlx(try_from = "i64")]
    permissions: ClubPermissions,
    position: i32,
    is_default: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Fetch a member's roles in a club together with the owner flag.
///
/// Single joined query; returns `None` when the user holds no role in the
/// club, which is the definition of "not a member". Serves both the actor
/// and the target side of an access check, one call per side.
#[tracing::instrument(skip(pool))]
pub async fn get_member_roles(
    pool: &PgPool,
    club_id: Uuid,
    user_id: Uuid,
) -> sqlx::Result<Option<MemberRoles>> {
    let rows: Vec<MemberRoleRow> = sqlx::query_as(
        r"
        SELECT (c.owner_id = cm.user_id) AS is_owner,
               r.id, r.club_id, r.name, r.color, r.permissions, r.position,
               r.is_default, r.created_at, r.updated_at
        FROM club_members cm
        INNER JOIN clubs c ON c.id = cm.club_id
        INNER JOIN club_member_roles cmr
            ON cmr.club_id = cm.club_id AND cmr.user_id = cm.user_id
        INNER JOIN club_roles r ON r.id = cmr.role_id
        WHERE cm.club_id = $1
          AND cm.user_id = $2
        ORDER BY r.position DESC
        ",
    )
    .bind(club_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let Some(first) = rows.first() else {
        return Ok(None);
    };
    let is_owner = first.is_owner;

    let roles = rows
        .into_iter()
        .map(|row| ClubRole {
            id: row.id,
            club_id: row.club_id,
            name: row.name,
            color: row.color,
            permissions: row.permissions,
            position: row.position,
            is_default: row.is_default,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
        .collect();

    Ok(Some(MemberRoles { roles, is_owner }))
}

/// Get all roles of a club, highest position first.
pub async fn get_club_roles(pool: &PgPool, club_id: Uuid) -> sqlx::Result<Vec<ClubRole>> {
    sqlx::query_as::<_, ClubRole>(
        r"
        SELECT id, club_id, name, color, permissions, position, is_default,
               created_at, updated_at
        FROM club_roles
        WHERE club_id = $1
        ORDER BY position DESC
        ",
    )
    .bind(club_id)
    .fetch_all(pool)
    .await
}
