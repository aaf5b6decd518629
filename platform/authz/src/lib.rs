//! Ownership-or-role authorization gate shared by every mutation endpoint.
//!
//! The gate resolves the caller and the target resource's owner through two
//! injected read-only sources, then feeds both into [`decide`], a pure
//! function that yields a flat [`AccessDecision`]. HTTP status mapping lives
//! with the transport layer, not here.

use std::future::Future;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed set of account roles.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Superadmin,
    Admin,
    Moderator,
    Owner,
    Editor,
    User,
    Guest,
}

/// Roles that may mutate resources they do not own.
pub const PRIVILEGED_ROLES: &[Role] = &[Role::Superadmin, Role::Admin, Role::Moderator];

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::Admin => "admin",
            Role::Moderator => "moderator",
            Role::Owner => "owner",
            Role::Editor => "editor",
            Role::User => "user",
            Role::Guest => "guest",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "superadmin" => Some(Role::Superadmin),
            "admin" => Some(Role::Admin),
            "moderator" => Some(Role::Moderator),
            "owner" => Some(Role::Owner),
            "editor" => Some(Role::Editor),
            "user" => Some(Role::User),
            "guest" => Some(Role::Guest),
            _ => None,
        }
    }

    /// Membership in the privileged set, checked as a pattern so a typo in a
    /// role name fails to compile instead of silently denying.
    pub fn is_privileged(self) -> bool {
        matches!(self, Role::Superadmin | Role::Admin | Role::Moderator)
    }
}

/// The authenticated caller as read from the user record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
    pub is_deleted: bool,
}

/// Caller identity after session resolution and role lookup.
///
/// `Anonymous` means no session at all; `Unknown` means the session named a
/// user id that no longer resolves to a row.
#[derive(Clone, Debug)]
pub enum Caller {
    Anonymous,
    Unknown,
    Known(Principal),
}

/// Outcome of an authorization check, computed per request and never stored.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AccessDecision {
    Allowed,
    NotAuthenticated,
    UserNotFound,
    UserDeleted,
    ResourceNotFound,
    InsufficientPermissions,
}

impl AccessDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, AccessDecision::Allowed)
    }
}

/// Pure decision function. Deterministic, no I/O, no hidden state.
///
/// A deleted principal is never authorized regardless of role. Otherwise
/// access is granted iff the caller owns the resource or carries one of
/// `allowed_roles`.
pub fn decide(caller: &Caller, owner_id: Option<Uuid>, allowed_roles: &[Role]) -> AccessDecision {
    let principal = match caller {
        Caller::Anonymous => return AccessDecision::NotAuthenticated,
        Caller::Unknown => return AccessDecision::UserNotFound,
        Caller::Known(principal) => principal,
    };
    if principal.is_deleted {
        return AccessDecision::UserDeleted;
    }
    let Some(owner_id) = owner_id else {
        return AccessDecision::ResourceNotFound;
    };
    if principal.id == owner_id || allowed_roles.contains(&principal.role) {
        return AccessDecision::Allowed;
    }
    AccessDecision::InsufficientPermissions
}

/// Read-only lookup of a caller's user record.
pub trait PrincipalSource {
    type Error;

    fn principal(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<Principal>, Self::Error>> + Send;
}

/// Read-only lookup of a resource's owner. Implementations must consult the
/// active set only, so soft-deleted resources resolve to `None`.
pub trait OwnershipSource {
    type Error;

    fn owner(
        &self,
        resource_id: Uuid,
    ) -> impl Future<Output = Result<Option<Uuid>, Self::Error>> + Send;
}

/// Full gate: session id -> concurrent role + ownership lookups -> decision.
///
/// The two lookups have no ordering dependency and are issued in parallel.
pub async fn authorize<P, O>(
    principals: &P,
    owners: &O,
    session_user: Option<Uuid>,
    resource_id: Uuid,
    allowed_roles: &[Role],
) -> Result<AccessDecision, P::Error>
where
    P: PrincipalSource + Sync,
    O: OwnershipSource<Error = P::Error> + Sync,
{
    let Some(caller_id) = session_user else {
        return Ok(AccessDecision::NotAuthenticated);
    };
    let (principal, owner_id) = tokio::try_join!(
        principals.principal(caller_id),
        owners.owner(resource_id)
    )?;
    let caller = match principal {
        Some(principal) => Caller::Known(principal),
        None => Caller::Unknown,
    };
    Ok(decide(&caller, owner_id, allowed_roles))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role) -> Principal {
        Principal {
            id: Uuid::new_v4(),
            role,
            is_deleted: false,
        }
    }

    #[test]
    fn anonymous_is_not_authenticated() {
        let decision = decide(&Caller::Anonymous, Some(Uuid::new_v4()), PRIVILEGED_ROLES);
        assert_eq!(decision, AccessDecision::NotAuthenticated);
    }

    #[test]
    fn unresolvable_session_user_is_reported() {
        let decision = decide(&Caller::Unknown, Some(Uuid::new_v4()), PRIVILEGED_ROLES);
        assert_eq!(decision, AccessDecision::UserNotFound);
    }

    #[test]
    fn deleted_principal_is_denied_even_with_admin_role() {
        let mut admin = principal(Role::Admin);
        admin.is_deleted = true;
        let owner = admin.id;
        let decision = decide(&Caller::Known(admin), Some(owner), PRIVILEGED_ROLES);
        assert_eq!(decision, AccessDecision::UserDeleted);
    }

    #[test]
    fn missing_resource_wins_over_privileged_role() {
        let decision = decide(&Caller::Known(principal(Role::Superadmin)), None, PRIVILEGED_ROLES);
        assert_eq!(decision, AccessDecision::ResourceNotFound);
    }

    #[test]
    fn owner_is_allowed_regardless_of_role() {
        let caller = principal(Role::Guest);
        let owner = caller.id;
        let decision = decide(&Caller::Known(caller), Some(owner), PRIVILEGED_ROLES);
        assert_eq!(decision, AccessDecision::Allowed);
    }

    #[test]
    fn privileged_roles_may_act_on_foreign_resources() {
        for role in [Role::Superadmin, Role::Admin, Role::Moderator] {
            let decision = decide(
                &Caller::Known(principal(role)),
                Some(Uuid::new_v4()),
                PRIVILEGED_ROLES,
            );
            assert_eq!(decision, AccessDecision::Allowed, "role {role:?}");
        }
    }

    #[test]
    fn unprivileged_non_owner_is_denied() {
        for role in [Role::Owner, Role::Editor, Role::User, Role::Guest] {
            let decision = decide(
                &Caller::Known(principal(role)),
                Some(Uuid::new_v4()),
                PRIVILEGED_ROLES,
            );
            assert_eq!(decision, AccessDecision::InsufficientPermissions, "role {role:?}");
        }
    }

    #[test]
    fn decision_is_deterministic() {
        let caller = Caller::Known(principal(Role::User));
        let owner = Some(Uuid::new_v4());
        let first = decide(&caller, owner, PRIVILEGED_ROLES);
        let second = decide(&caller, owner, PRIVILEGED_ROLES);
        assert_eq!(first, second);
    }

    #[test]
    fn privileged_set_matches_predicate() {
        for role in [
            Role::Superadmin,
            Role::Admin,
            Role::Moderator,
            Role::Owner,
            Role::Editor,
            Role::User,
            Role::Guest,
        ] {
            assert_eq!(PRIVILEGED_ROLES.contains(&role), role.is_privileged());
        }
    }

    #[test]
    fn role_strings_round_trip() {
        for role in PRIVILEGED_ROLES {
            assert_eq!(Role::parse(role.as_str()), Some(*role));
        }
        assert_eq!(Role::parse("SUPERADMIN"), Some(Role::Superadmin));
        assert_eq!(Role::parse("janitor"), None);
    }
}
