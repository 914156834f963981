//! Access-control decision functions.
//!
//! Two predicates composed with OR: resource ownership and the ADMIN
//! role. Every mutating operation on a per-user resource consults
//! [`can_access`] with the resource's owning user id; route-level role
//! gates use [`has_role`]. An absent principal (anonymous request) fails
//! every predicate.

use crate::models::Principal;

/// True when the caller is the owner of the target user's resources.
pub fn is_owner(principal: Option<&Principal>, target_user_id: i64) -> bool {
    match principal {
        Some(p) => p.user_id == target_user_id,
        None => false,
    }
}

/// True when the caller holds the given role (case-insensitive).
pub fn has_role(principal: Option<&Principal>, role_name: &str) -> bool {
    match principal {
        Some(p) => p.roles.iter().any(|r| r.eq_ignore_ascii_case(role_name)),
        None => false,
    }
}

/// True when the caller holds the ADMIN role.
pub fn is_admin(principal: Option<&Principal>) -> bool {
    has_role(principal, "ADMIN")
}

/// True when the caller may act on a resource owned by `target_user_id`:
/// either the caller owns it, or the caller is an administrator.
pub fn can_access(principal: Option<&Principal>, target_user_id: i64) -> bool {
    is_owner(principal, target_user_id) || is_admin(principal)
}
