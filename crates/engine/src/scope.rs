//! Read visibility.
//!
//! Role affects what a user may *read*; writes are always restricted to the
//! requester's own entries regardless of scope.

use serde::{Deserialize, Serialize};

use crate::{Profile, Role};

/// Set of ledger entries a request may read or aggregate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    /// Every entry of every user.
    All,
    /// Only entries owned by this username.
    OwnedBy(String),
}

impl Scope {
    pub fn role(&self) -> Role {
        match self {
            Self::All => Role::Owner,
            Self::OwnedBy(_) => Role::Staff,
        }
    }
}

/// Resolve the read scope of `username`.
///
/// Only an existing profile with the `owner` role widens the scope; a missing
/// profile falls back to the user's own entries.
pub fn resolve_scope(username: &str, profile: Option<&Profile>) -> Scope {
    match profile {
        Some(profile) if profile.role == Role::Owner => Scope::All,
        _ => Scope::OwnedBy(username.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(role: Role) -> Profile {
        Profile {
            username: "alice".to_string(),
            role,
            name: None,
            email: None,
        }
    }

    #[test]
    fn owner_profile_sees_everything() {
        let scope = resolve_scope("alice", Some(&profile(Role::Owner)));
        assert_eq!(scope, Scope::All);
        assert_eq!(scope.role(), Role::Owner);
    }

    #[test]
    fn staff_profile_sees_own_entries() {
        let scope = resolve_scope("alice", Some(&profile(Role::Staff)));
        assert_eq!(scope, Scope::OwnedBy("alice".to_string()));
        assert_eq!(scope.role(), Role::Staff);
    }

    #[test]
    fn missing_profile_is_least_privilege() {
        assert_eq!(
            resolve_scope("carol", None),
            Scope::OwnedBy("carol".to_string())
        );
    }
}
