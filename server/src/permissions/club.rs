//! Club-level permissions using bitflags.
//!
//! Each capability occupies one bit of a 64-bit mask. `ADMINISTRATOR` is
//! special: accumulating any role that carries it grants the full mask.
//! The mask is the storage/wire representation; external callers only ever
//! see the permission *names* produced by [`ClubPermissions::names`].

use bitflags::bitflags;

bitflags! {
    /// Club permissions represented as a 64-bit bitfield.
    ///
    /// Stored as BIGINT in PostgreSQL for efficient database operations.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
    #[serde(transparent)]
    pub struct ClubPermissions: u64 {
        /// Grants every other permission through accumulation.
        const ADMINISTRATOR     = 1 << 0;
        /// Permission to edit club profile (name, description, logo, banner)
        const MANAGE_CLUB       = 1 << 1;
        /// Permission to approve or reject join requests
        const MANAGE_MEMBERSHIP = 1 << 2;
        /// Permission to kick members from the club
        const KICK_MEMBER       = 1 << 3;
        /// Permission to ban members from the club
        const BAN_MEMBER        = 1 << 4;
        /// Permission to create, edit, and delete club roles
        const MANAGE_ROLES      = 1 << 5;
    }
}

/// Closed name<->bit table. The permission set is fixed, so the mapping is a
/// compile-time bijection; both conversion directions walk this table.
const NAMES: [(ClubPermissions, &str); 6] = [
    (ClubPermissions::ADMINISTRATOR, "Administrator"),
    (ClubPermissions::MANAGE_CLUB, "ManageClub"),
    (ClubPermissions::MANAGE_MEMBERSHIP, "ManageMembership"),
    (ClubPermissions::KICK_MEMBER, "KickMember"),
    (ClubPermissions::BAN_MEMBER, "BanMember"),
    (ClubPermissions::MANAGE_ROLES, "ManageRoles"),
];

/// A permission name outside the closed enumeration was supplied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid permission name: {0}")]
pub struct InvalidPermissionName(pub String);

impl ClubPermissions {
    // === Preset Combinations ===

    /// Default permissions for the president role created on club approval.
    ///
    /// Everything except `ADMINISTRATOR`; the president outranks everyone by
    /// position and the owner flag already bypasses permission checks.
    pub const PRESIDENT_DEFAULT: Self = Self::MANAGE_CLUB
        .union(Self::MANAGE_MEMBERSHIP)
        .union(Self::KICK_MEMBER)
        .union(Self::BAN_MEMBER)
        .union(Self::MANAGE_ROLES);

    // === Database Conversion ===

    /// Create permissions from a database BIGINT value.
    ///
    /// Reinterprets the i64 bit pattern as u64. Unknown bits are silently
    /// dropped to maintain forward compatibility.
    #[must_use]
    pub const fn from_db(value: i64) -> Self {
        Self::from_bits_truncate(value as u64)
    }

    /// Convert permissions to a database BIGINT value.
    #[must_use]
    pub const fn to_db(self) -> i64 {
        self.bits() as i64
    }

    // === Name Conversion ===

    /// Resolve a single permission name to its bit.
    ///
    /// Returns `None` for names outside the enumeration.
    #[must_use]
    pub fn bit_from_name(name: &str) -> Option<Self> {
        NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(bit, _)| *bit)
    }

    /// Decode the mask into the names of every set bit.
    ///
    /// `ClubPermissions::empty()` decodes to an empty list. Never fails;
    /// unknown bits cannot occur because construction truncates them.
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        NAMES
            .iter()
            .filter(|(bit, _)| self.intersects(*bit))
            .map(|(_, name)| *name)
            .collect()
    }

    /// Encode a list of permission names into a mask.
    ///
    /// The union is computed in full before returning, so an invalid name
    /// anywhere in the input fails the whole call without a partial mask.
    pub fn encode<'a, I>(names: I) -> Result<Self, InvalidPermissionName>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut mask = Self::empty();
        for name in names {
            let bit =
                Self::bit_from_name(name).ok_or_else(|| InvalidPermissionName(name.to_owned()))?;
            mask |= bit;
        }
        Ok(mask)
    }

    // === Permission Checking ===

    /// Check whether any bit of `permission` is present in this mask.
    ///
    /// This is a set-membership test, not equality: a mask satisfies several
    /// permission checks at once.
    ///
    /// # Examples
    ///
    /// ```
    /// use club_server::permissions::ClubPermissions;
    ///
    /// let perms = ClubPermissions::MANAGE_CLUB | ClubPermissions::KICK_MEMBER;
    /// assert!(perms.has(ClubPermissions::MANAGE_CLUB));
    /// assert!(!perms.has(ClubPermissions::BAN_MEMBER));
    /// ```
    #[must_use]
    pub const fn has(self, permission: Self) -> bool {
        self.intersects(permission)
    }
}

impl Default for ClubPermissions {
    fn default() -> Self {
        Self::empty()
    }
}
