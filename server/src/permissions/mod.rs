//! Permission system types and utilities.
//!
//! Two cooperating pieces:
//! - Permission model: named capabilities packed into a 64-bit mask
//! - Access control: owner/hierarchy/mask decisions for member actions

pub mod access;
pub mod club;
pub mod models;
pub mod queries;

pub use access::{
    accumulate_permissions, can_act_on_member, can_handle_membership_request,
    highest_role_position, AccessError, RoleStore,
};
pub use club::{ClubPermissions, InvalidPermissionName};
pub use models::{ClubRole, MemberRoles};
pub use queries::{get_club_roles, get_member_roles};
