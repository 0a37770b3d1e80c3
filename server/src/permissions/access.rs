//! Access control decisions for member-targeting actions.
//!
//! Every decision is a pure function of the role sets fetched for the given
//! (club, user) pairs; nothing is cached between calls. The two fetches of
//! [`can_act_on_member`] are sequential and unsynchronized: roles may change
//! between them. That staleness window is accepted; the checks here are
//! advisory authorization, not ledger-grade consistency.

use std::future::Future;

use sqlx::PgPool;
use uuid::Uuid;

use super::club::ClubPermissions;
use super::models::{ClubRole, MemberRoles};
use super::queries;

/// Access control check errors.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// The acting user holds no role in the club.
    #[error("user is not a club member")]
    ActorNotClubMember,

    /// The targeted user holds no role in the club.
    #[error("target user is not a club member")]
    TargetNotClubMember,

    /// The actor's highest role is ranked below the target's.
    #[error("actor role position {actor_position} is below target role position {target_position}")]
    InsufficientRolePosition {
        actor_position: i32,
        target_position: i32,
    },

    /// A member row exists without any role rows. The membership guards make
    /// this unreachable unless the stored data is corrupt, so it surfaces as
    /// an internal failure instead of a silent position of 0.
    #[error("member has an empty role set")]
    EmptyRoleSet,

    /// Storage failure, propagated unchanged.
    #[error("failed to load member roles: {0}")]
    Database(#[from] sqlx::Error),
}

/// Source of a member's roles and owner flag for one club.
///
/// This is the single storage contract the engine consumes; it is invoked
/// once per side of a check. `None` means the user holds no role in the club
/// and therefore is not a member.
pub trait RoleStore {
    fn member_roles(
        &self,
        club_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = sqlx::Result<Option<MemberRoles>>> + Send;
}

impl RoleStore for PgPool {
    async fn member_roles(
        &self,
        club_id: Uuid,
        user_id: Uuid,
    ) -> sqlx::Result<Option<MemberRoles>> {
        queries::get_member_roles(self, club_id, user_id).await
    }
}

/// Union the permission masks of a role set.
///
/// `ADMINISTRATOR` on any single role short-circuits to the full mask,
/// regardless of what the other roles carry. An empty set accumulates to
/// nothing.
#[must_use]
pub fn accumulate_permissions(roles: &[ClubRole]) -> ClubPermissions {
    let mut accumulated = ClubPermissions::empty();
    for role in roles {
        if role.permissions.has(ClubPermissions::ADMINISTRATOR) {
            return ClubPermissions::all();
        }
        accumulated |= role.permissions;
    }
    accumulated
}

/// Highest role position in a set (larger number = higher authority).
///
/// An empty set is a contract violation, not a position of 0.
pub fn highest_role_position(roles: &[ClubRole]) -> Result<i32, AccessError> {
    roles
        .iter()
        .map(|role| role.position)
        .max()
        .ok_or(AccessError::EmptyRoleSet)
}

/// Can `actor_id` perform a `permission`-gated action against `target_id`?
///
/// Decision order:
/// 1. Actor must be a member; the club owner is authorized unconditionally
///    (the target is not even fetched for an owner).
/// 2. Target must be a member; a target owner can never be acted upon by a
///    non-owner. That is `Ok(false)`, not an error.
/// 3. An actor whose highest role position is strictly below the target's is
///    rejected with [`AccessError::InsufficientRolePosition`]. Equal highest
///    positions pass: peers may act on peers.
/// 4. Otherwise the decision is the accumulated-mask membership test.
#[tracing::instrument(skip(store))]
pub async fn can_act_on_member<S: RoleStore>(
    store: &S,
    club_id: Uuid,
    actor_id: Uuid,
    target_id: Uuid,
    permission: ClubPermissions,
) -> Result<bool, AccessError> {
    let actor = store
        .member_roles(club_id, actor_id)
        .await?
        .ok_or(AccessError::ActorNotClubMember)?;
    if actor.is_owner {
        return Ok(true);
    }

    let target = store
        .member_roles(club_id, target_id)
        .await?
        .ok_or(AccessError::TargetNotClubMember)?;
    if target.is_owner {
        return Ok(false);
    }

    let actor_position = highest_role_position(&actor.roles)?;
    let target_position = highest_role_position(&target.roles)?;
    if actor_position < target_position {
        return Err(AccessError::InsufficientRolePosition {
            actor_position,
            target_position,
        });
    }

    Ok(accumulate_permissions(&actor.roles).has(permission))
}

/// Can `actor_id` approve or reject pending join requests for the club?
///
/// The join requester is not yet a member, so no position hierarchy applies:
/// owner passes unconditionally, everyone else needs `MANAGE_MEMBERSHIP` in
/// their accumulated mask.
#[tracing::instrument(skip(store))]
pub async fn can_handle_membership_request<S: RoleStore>(
    store: &S,
    club_id: Uuid,
    actor_id: Uuid,
) -> Result<bool, AccessError> {
    let actor = store
        .member_roles(club_id, actor_id)
        .await?
        .ok_or(AccessError::ActorNotClubMember)?;
    if actor.is_owner {
        return Ok(true);
    }

    Ok(accumulate_permissions(&actor.roles).has(ClubPermissions::MANAGE_MEMBERSHIP))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    /// In-memory [`RoleStore`] keyed by (club, user).
    struct MapStore(HashMap<(Uuid, Uuid), MemberRoles>);

    impl MapStore {
        fn new() -> Self {
            Self(HashMap::new())
        }

        fn insert(&mut self, club_id: Uuid, user_id: Uuid, member: MemberRoles) {
            self.0.insert((club_id, user_id), member);
        }
    }

    impl RoleStore for MapStore {
        async fn member_roles(
            &self,
            club_id: Uuid,
            user_id: Uuid,
        ) -> sqlx::Result<Option<MemberRoles>> {
            Ok(self.0.get(&(club_id, user_id)).cloned())
        }
    }

    fn role(position: i32, permissions: ClubPermissions) -> ClubRole {
        ClubRole {
            id: Uuid::now_v7(),
            club_id: Uuid::now_v7(),
            name: "test".to_string(),
            color: None,
            permissions,
            position,
            is_default: false,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn member(is_owner: bool, roles: Vec<ClubRole>) -> MemberRoles {
        MemberRoles { roles, is_owner }
    }

    // === Accumulation Tests ===

    #[test]
    fn test_accumulate_empty_is_zero() {
        assert_eq!(accumulate_permissions(&[]), ClubPermissions::empty());
    }

    #[test]
    fn test_accumulate_unions_role_masks() {
        let roles = [
            role(1, ClubPermissions::MANAGE_CLUB),
            role(2, ClubPermissions::MANAGE_MEMBERSHIP),
            role(3, ClubPermissions::KICK_MEMBER),
        ];
        assert_eq!(
            accumulate_permissions(&roles),
            ClubPermissions::MANAGE_CLUB
                | ClubPermissions::MANAGE_MEMBERSHIP
                | ClubPermissions::KICK_MEMBER
        );
    }

    #[test]
    fn test_accumulate_administrator_short_circuits_to_all() {
        let roles = [
            role(1, ClubPermissions::KICK_MEMBER),
            role(2, ClubPermissions::ADMINISTRATOR),
            role(3, ClubPermissions::empty()),
        ];
        assert_eq!(accumulate_permissions(&roles), ClubPermissions::all());
    }

    #[test]
    fn test_accumulate_concrete_scenario() {
        let roles = [role(
            1,
            ClubPermissions::MANAGE_CLUB | ClubPermissions::MANAGE_MEMBERSHIP,
        )];
        let mask = accumulate_permissions(&roles);
        assert!(mask.has(ClubPermissions::MANAGE_CLUB));
        assert!(mask.has(ClubPermissions::MANAGE_MEMBERSHIP));
        assert!(!mask.has(ClubPermissions::BAN_MEMBER));
    }

    // === Position Tests ===

    #[test]
    fn test_highest_role_position_takes_max() {
        let roles = [
            role(3, ClubPermissions::empty()),
            role(7, ClubPermissions::empty()),
            role(5, ClubPermissions::empty()),
        ];
        assert_eq!(highest_role_position(&roles).unwrap(), 7);
    }

    #[test]
    fn test_highest_role_position_rejects_empty_set() {
        assert!(matches!(
            highest_role_position(&[]),
            Err(AccessError::EmptyRoleSet)
        ));
    }

    // === can_act_on_member Tests ===

    #[tokio::test]
    async fn test_owner_actor_is_always_authorized() {
        let club_id = Uuid::now_v7();
        let owner_id = Uuid::now_v7();
        let target_id = Uuid::now_v7();

        let mut store = MapStore::new();
        store.insert(
            club_id,
            owner_id,
            member(true, vec![role(1, ClubPermissions::empty())]),
        );
        // The target is intentionally absent: the owner check happens before
        // the target fetch, so the missing target must not matter.
        let allowed = can_act_on_member(
            &store,
            club_id,
            owner_id,
            target_id,
            ClubPermissions::BAN_MEMBER,
        )
        .await
        .unwrap();
        assert!(allowed);
    }

    #[tokio::test]
    async fn test_owner_target_is_never_acted_upon() {
        let club_id = Uuid::now_v7();
        let actor_id = Uuid::now_v7();
        let owner_id = Uuid::now_v7();

        let mut store = MapStore::new();
        // Even an administrator actor with the higher position is refused.
        store.insert(
            club_id,
            actor_id,
            member(false, vec![role(100, ClubPermissions::ADMINISTRATOR)]),
        );
        store.insert(
            club_id,
            owner_id,
            member(true, vec![role(1, ClubPermissions::empty())]),
        );

        let allowed = can_act_on_member(
            &store,
            club_id,
            actor_id,
            owner_id,
            ClubPermissions::KICK_MEMBER,
        )
        .await
        .unwrap();
        assert!(!allowed);
    }

    #[tokio::test]
    async fn test_missing_actor_is_reported_distinctly() {
        let club_id = Uuid::now_v7();
        let store = MapStore::new();

        let err = can_act_on_member(
            &store,
            club_id,
            Uuid::now_v7(),
            Uuid::now_v7(),
            ClubPermissions::KICK_MEMBER,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AccessError::ActorNotClubMember));
    }

    #[tokio::test]
    async fn test_missing_target_is_reported_distinctly() {
        let club_id = Uuid::now_v7();
        let actor_id = Uuid::now_v7();

        let mut store = MapStore::new();
        store.insert(
            club_id,
            actor_id,
            member(false, vec![role(5, ClubPermissions::KICK_MEMBER)]),
        );

        let err = can_act_on_member(
            &store,
            club_id,
            actor_id,
            Uuid::now_v7(),
            ClubPermissions::KICK_MEMBER,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AccessError::TargetNotClubMember));
    }

    #[tokio::test]
    async fn test_lower_position_is_rejected_regardless_of_mask() {
        let club_id = Uuid::now_v7();
        let actor_id = Uuid::now_v7();
        let target_id = Uuid::now_v7();

        let mut store = MapStore::new();
        store.insert(
            club_id,
            actor_id,
            member(false, vec![role(3, ClubPermissions::ADMINISTRATOR)]),
        );
        store.insert(
            club_id,
            target_id,
            member(false, vec![role(5, ClubPermissions::empty())]),
        );

        let err = can_act_on_member(
            &store,
            club_id,
            actor_id,
            target_id,
            ClubPermissions::KICK_MEMBER,
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            AccessError::InsufficientRolePosition {
                actor_position: 3,
                target_position: 5,
            }
        ));
    }

    #[tokio::test]
    async fn test_equal_positions_fall_through_to_mask_test() {
        let club_id = Uuid::now_v7();
        let actor_id = Uuid::now_v7();
        let target_id = Uuid::now_v7();

        let mut store = MapStore::new();
        store.insert(
            club_id,
            actor_id,
            member(false, vec![role(5, ClubPermissions::KICK_MEMBER)]),
        );
        store.insert(
            club_id,
            target_id,
            member(false, vec![role(5, ClubPermissions::empty())]),
        );

        // Tie passes the hierarchy check; the mask decides.
        let allowed = can_act_on_member(
            &store,
            club_id,
            actor_id,
            target_id,
            ClubPermissions::KICK_MEMBER,
        )
        .await
        .unwrap();
        assert!(allowed);

        let allowed = can_act_on_member(
            &store,
            club_id,
            actor_id,
            target_id,
            ClubPermissions::BAN_MEMBER,
        )
        .await
        .unwrap();
        assert!(!allowed);
    }

    #[tokio::test]
    async fn test_missing_permission_is_a_plain_false_not_an_error() {
        let club_id = Uuid::now_v7();
        let actor_id = Uuid::now_v7();
        let target_id = Uuid::now_v7();

        let mut store = MapStore::new();
        store.insert(
            club_id,
            actor_id,
            member(false, vec![role(9, ClubPermissions::MANAGE_CLUB)]),
        );
        store.insert(
            club_id,
            target_id,
            member(false, vec![role(1, ClubPermissions::empty())]),
        );

        let allowed = can_act_on_member(
            &store,
            club_id,
            actor_id,
            target_id,
            ClubPermissions::KICK_MEMBER,
        )
        .await
        .unwrap();
        assert!(!allowed);
    }

    #[tokio::test]
    async fn test_permissions_accumulate_across_actor_roles() {
        let club_id = Uuid::now_v7();
        let actor_id = Uuid::now_v7();
        let target_id = Uuid::now_v7();

        let mut store = MapStore::new();
        store.insert(
            club_id,
            actor_id,
            member(
                false,
                vec![
                    role(2, ClubPermissions::MANAGE_CLUB),
                    role(8, ClubPermissions::KICK_MEMBER),
                ],
            ),
        );
        store.insert(
            club_id,
            target_id,
            member(false, vec![role(4, ClubPermissions::empty())]),
        );

        // Highest position is 8 (above the target's 4), and the union of
        // both role masks carries KICK_MEMBER.
        let allowed = can_act_on_member(
            &store,
            club_id,
            actor_id,
            target_id,
            ClubPermissions::KICK_MEMBER,
        )
        .await
        .unwrap();
        assert!(allowed);
    }

    // === can_handle_membership_request Tests ===

    #[tokio::test]
    async fn test_membership_request_requires_manage_membership() {
        let club_id = Uuid::now_v7();
        let actor_id = Uuid::now_v7();

        let mut store = MapStore::new();
        store.insert(
            club_id,
            actor_id,
            member(false, vec![role(5, ClubPermissions::KICK_MEMBER)]),
        );

        // KickMember alone does not allow handling join requests.
        let allowed = can_handle_membership_request(&store, club_id, actor_id)
            .await
            .unwrap();
        assert!(!allowed);
    }

    #[tokio::test]
    async fn test_membership_request_allows_manager() {
        let club_id = Uuid::now_v7();
        let actor_id = Uuid::now_v7();

        let mut store = MapStore::new();
        store.insert(
            club_id,
            actor_id,
            member(false, vec![role(2, ClubPermissions::MANAGE_MEMBERSHIP)]),
        );

        let allowed = can_handle_membership_request(&store, club_id, actor_id)
            .await
            .unwrap();
        assert!(allowed);
    }

    #[tokio::test]
    async fn test_membership_request_allows_administrator_and_owner() {
        let club_id = Uuid::now_v7();
        let admin_id = Uuid::now_v7();
        let owner_id = Uuid::now_v7();

        let mut store = MapStore::new();
        store.insert(
            club_id,
            admin_id,
            member(false, vec![role(1, ClubPermissions::ADMINISTRATOR)]),
        );
        store.insert(club_id, owner_id, member(true, vec![]));

        assert!(can_handle_membership_request(&store, club_id, admin_id)
            .await
            .unwrap());
        // Owners bypass role checks entirely, even with an empty role set.
        assert!(can_handle_membership_request(&store, club_id, owner_id)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_membership_request_rejects_non_member() {
        let store = MapStore::new();
        let err = can_handle_membership_request(&store, Uuid::now_v7(), Uuid::now_v7())
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::ActorNotClubMember));
    }
}
