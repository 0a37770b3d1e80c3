//! Database queries for club management and listing.

use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::types::{Club, ClubMember, ClubWithMemberCount, PendingClub};
use crate::pagination::{Filters, Metadata};
use crate::permissions::ClubPermissions;
use crate::users::User;

/// Create a club and its approval request in one transaction.
///
/// The club starts unapproved; roles and the owner's membership appear only
/// once the club is approved.
#[tracing::instrument(skip(pool, description))]
pub async fn create_club(
    pool: &PgPool,
    owner_id: Uuid,
    name: &str,
    description: Option<&str>,
    club_type: &str,
) -> sqlx::Result<Club> {
    let mut tx = pool.begin().await?;

    let club = sqlx::query_as::<_, Club>(
        r"
        INSERT INTO clubs (id, name, description, club_type, owner_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, name, description, club_type, logo_url, banner_url,
                  owner_id, approved, created_at
        ",
    )
    .bind(Uuid::now_v7())
    .bind(name)
    .bind(description)
    .bind(club_type)
    .bind(owner_id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO create_club_requests (club_id, user_id) VALUES ($1, $2)")
        .bind(club.id)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(club)
}

/// Approve a pending club.
///
/// Transactionally removes the creation request, flips the approved flag,
/// creates the club's starting roles (president and the default member
/// role), and enrolls the requester as owner with the president role.
/// Returns `false` when there is nothing to approve (unknown club or
/// already approved).
#[tracing::instrument(skip(pool))]
pub async fn approve_club(pool: &PgPool, club_id: Uuid) -> sqlx::Result<bool> {
    let mut tx = pool.begin().await?;

    let requester: Option<(Uuid,)> =
        sqlx::query_as("DELETE FROM create_club_requests WHERE club_id = $1 RETURNING user_id")
            .bind(club_id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some((owner_id,)) = requester else {
        return Ok(false);
    };

    let result = sqlx::query("UPDATE clubs SET approved = true WHERE id = $1 AND NOT approved")
        .bind(club_id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        // Dropping the transaction rolls the request delete back.
        return Ok(false);
    }

    let president_role_id = Uuid::now_v7();
    sqlx::query(
        r"
        INSERT INTO club_roles (id, club_id, name, color, permissions, position, is_default)
        VALUES ($1, $2, 'president', '#e74c3c', $3, 100, false)
        ",
    )
    .bind(president_role_id)
    .bind(club_id)
    .bind(ClubPermissions::PRESIDENT_DEFAULT.to_db())
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r"
        INSERT INTO club_roles (id, club_id, name, permissions, position, is_default)
        VALUES ($1, $2, 'member', 0, 1, true)
        ",
    )
    .bind(Uuid::now_v7())
    .bind(club_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO club_members (club_id, user_id) VALUES ($1, $2)")
        .bind(club_id)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("INSERT INTO club_member_roles (club_id, user_id, role_id) VALUES ($1, $2, $3)")
        .bind(club_id)
        .bind(owner_id)
        .bind(president_role_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(true)
}

/// Reject a pending club: drop the request and the unapproved club row.
///
/// Returns `false` when no unapproved club with this id exists.
#[tracing::instrument(skip(pool))]
pub async fn reject_club(pool: &PgPool, club_id: Uuid) -> sqlx::Result<bool> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM create_club_requests WHERE club_id = $1")
        .bind(club_id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM clubs WHERE id = $1 AND NOT approved")
        .bind(club_id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        return Ok(false);
    }

    tx.commit().await?;

    Ok(true)
}

/// Get an approved club by id, with its member count.
pub async fn get_club_by_id(
    pool: &PgPool,
    club_id: Uuid,
) -> sqlx::Result<Option<ClubWithMemberCount>> {
    sqlx::query_as::<_, ClubWithMemberCount>(
        r"
        SELECT c.id, c.name, c.description, c.club_type, c.logo_url, c.banner_url,
               c.owner_id, c.approved, c.created_at,
               COUNT(cm.user_id) AS member_count
        FROM clubs c
        LEFT JOIN club_members cm ON c.id = cm.club_id
        WHERE c.id = $1
          AND c.approved
        GROUP BY c.id
        ",
    )
    .bind(club_id)
    .fetch_optional(pool)
    .await
}

#[derive(Debug, FromRow)]
struct ClubListRow {
    total: i64,
    #[sqlx(flatten)]
    club: Club,
    member_count: i64,
}

/// List approved clubs with substring search, type filter and pagination.
#[tracing::instrument(skip(pool))]
pub async fn list_clubs(
    pool: &PgPool,
    search: &str,
    club_types: Option<Vec<String>>,
    filters: Filters,
) -> sqlx::Result<(Vec<ClubWithMemberCount>, Metadata)> {
    let rows: Vec<ClubListRow> = sqlx::query_as(
        r"
        SELECT count(*) OVER() AS total,
               c.id, c.name, c.description, c.club_type, c.logo_url, c.banner_url,
               c.owner_id, c.approved, c.created_at,
               COUNT(cm.user_id) AS member_count
        FROM clubs c
        LEFT JOIN club_members cm ON c.id = cm.club_id
        WHERE ( STRPOS(LOWER(c.name), LOWER($1)) > 0
                OR STRPOS(LOWER(COALESCE(c.description, '')), LOWER($1)) > 0
                OR $1 = '' )
          AND (c.club_type = ANY($2) OR $2::text[] IS NULL)
          AND c.approved
        GROUP BY c.id
        ORDER BY c.id
        LIMIT $3 OFFSET $4
        ",
    )
    .bind(search)
    .bind(club_types)
    .bind(filters.limit())
    .bind(filters.offset())
    .fetch_all(pool)
    .await?;

    let total = rows.first().map_or(0, |row| row.total) as i32;
    let clubs = rows
        .into_iter()
        .map(|row| ClubWithMemberCount {
            club: row.club,
            member_count: row.member_count,
        })
        .collect();

    Ok((
        clubs,
        Metadata::calculate(total, filters.page, filters.page_size),
    ))
}

#[derive(Debug, FromRow)]
struct PendingClubRow {
    total: i64,
    #[sqlx(flatten)]
    club: Club,
    requester_id: Uuid,
    email: String,
    barcode: String,
    first_name: String,
    last_name: String,
    avatar_url: Option<String>,
    requester_created_at: chrono::DateTime<chrono::Utc>,
}

/// List clubs awaiting approval, each with the requesting user.
#[tracing::instrument(skip(pool))]
pub async fn list_pending_clubs(
    pool: &PgPool,
    search: &str,
    club_types: Option<Vec<String>>,
    filters: Filters,
) -> sqlx::Result<(Vec<PendingClub>, Metadata)> {
    let rows: Vec<PendingClubRow> = sqlx::query_as(
        r"
        SELECT count(*) OVER() AS total,
               c.id, c.name, c.description, c.club_type, c.logo_url, c.banner_url,
               c.owner_id, c.approved, c.created_at,
               u.id AS requester_id, u.email, u.barcode, u.first_name, u.last_name,
               u.avatar_url, u.created_at AS requester_created_at
        FROM clubs c
        INNER JOIN create_club_requests ccr ON c.id = ccr.club_id
        INNER JOIN users u ON u.id = ccr.user_id
        WHERE ( STRPOS(LOWER(c.name), LOWER($1)) > 0
                OR STRPOS(LOWER(COALESCE(c.description, '')), LOWER($1)) > 0
                OR $1 = '' )
          AND (c.club_type = ANY($2) OR $2::text[] IS NULL)
          AND NOT c.approved
        ORDER BY c.id
        LIMIT $3 OFFSET $4
        ",
    )
    .bind(search)
    .bind(club_types)
    .bind(filters.limit())
    .bind(filters.offset())
    .fetch_all(pool)
    .await?;

    let total = rows.first().map_or(0, |row| row.total) as i32;
    let clubs = rows
        .into_iter()
        .map(|row| PendingClub {
            club: row.club,
            requested_by: User {
                id: row.requester_id,
                email: row.email,
                barcode: row.barcode,
                first_name: row.first_name,
                last_name: row.last_name,
                avatar_url: row.avatar_url,
                created_at: row.requester_created_at,
            },
        })
        .collect();

    Ok((
        clubs,
        Metadata::calculate(total, filters.page, filters.page_size),
    ))
}

/// List the approved clubs a user belongs to.
pub async fn get_user_clubs(pool: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<ClubWithMemberCount>> {
    sqlx::query_as::<_, ClubWithMemberCount>(
        r"
        SELECT c.id, c.name, c.description, c.club_type, c.logo_url, c.banner_url,
               c.owner_id, c.approved, c.created_at,
               (SELECT COUNT(*) FROM club_members cm2 WHERE cm2.club_id = c.id) AS member_count
        FROM club_members cm
        INNER JOIN clubs c ON c.id = cm.club_id
        WHERE cm.user_id = $1
        ORDER BY c.created_at
        ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

#[derive(Debug, FromRow)]
struct ClubMemberRow {
    total: i64,
    #[sqlx(flatten)]
    member: ClubMember,
}

/// List club members with their role names, paginated.
#[tracing::instrument(skip(pool))]
pub async fn list_club_members(
    pool: &PgPool,
    club_id: Uuid,
    filters: Filters,
) -> sqlx::Result<(Vec<ClubMember>, Metadata)> {
    let rows: Vec<ClubMemberRow> = sqlx::query_as(
        r"
        SELECT count(*) OVER() AS total,
               u.id, u.email, u.barcode, u.first_name, u.last_name, u.avatar_url,
               ARRAY_AGG(r.name ORDER BY r.position DESC) AS roles
        FROM club_members cm
        INNER JOIN users u ON u.id = cm.user_id
        INNER JOIN club_member_roles cmr
            ON cmr.club_id = cm.club_id AND cmr.user_id = cm.user_id
        INNER JOIN club_roles r ON r.id = cmr.role_id
        WHERE cm.club_id = $1
        GROUP BY u.id
        ORDER BY u.id
        LIMIT $2 OFFSET $3
        ",
    )
    .bind(club_id)
    .bind(filters.limit())
    .bind(filters.offset())
    .fetch_all(pool)
    .await?;

    let total = rows.first().map_or(0, |row| row.total) as i32;
    let members = rows.into_iter().map(|row| row.member).collect();

    Ok((
        members,
        Metadata::calculate(total, filters.page, filters.page_size),
    ))
}
