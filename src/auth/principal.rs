// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authenticated principals and their resolution from the user store.

use std::{collections::BTreeSet, sync::Arc};

use super::AuthError;
use crate::storage::UserStore;

/// Baseline role granted to every authenticated user.
pub const ROLE_USER: &str = "ROLE_USER";

/// The authenticated identity behind a request.
///
/// Built fresh for every request from the token subject and the user store;
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub roles: BTreeSet<String>,
}

impl Principal {
    /// A principal holding only [`ROLE_USER`].
    pub fn user(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            roles: BTreeSet::from([ROLE_USER.to_string()]),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

/// Resolves token subjects to principals.
#[derive(Clone)]
pub struct PrincipalLookup {
    users: Arc<dyn UserStore>,
}

impl PrincipalLookup {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Look up `username` exactly. Every user gets the single baseline role.
    pub fn resolve(&self, username: &str) -> Result<Principal, AuthError> {
        match self.users.find_by_username(username) {
            Ok(Some(user)) => Ok(Principal::user(user.username)),
            Ok(None) => Err(AuthError::PrincipalNotFound(username.to_string())),
            Err(e) => Err(AuthError::InternalError(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use crate::storage::InMemoryStore;

    fn lookup_with(usernames: &[&str]) -> PrincipalLookup {
        let store = InMemoryStore::new();
        for name in usernames {
            store
                .insert_user(NewUser {
                    username: name.to_string(),
                    first_name: name.to_string(),
                    last_name: None,
                    email: format!("{name}@example.com"),
                })
                .unwrap();
        }
        PrincipalLookup::new(Arc::new(store))
    }

    #[test]
    fn resolves_existing_user_with_baseline_role() {
        let principal = lookup_with(&["alice"]).resolve("alice").unwrap();
        assert_eq!(principal.username, "alice");
        assert!(principal.has_role(ROLE_USER));
        assert_eq!(principal.roles.len(), 1);
    }

    #[test]
    fn missing_user_is_not_found() {
        let result = lookup_with(&["alice"]).resolve("ghost");
        assert!(matches!(result, Err(AuthError::PrincipalNotFound(name)) if name == "ghost"));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert!(lookup_with(&["alice"]).resolve("ALICE").is_err());
    }
}
