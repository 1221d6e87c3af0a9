// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-request authentication gate.
//!
//! The gate only annotates: it turns an `Authorization: Bearer <jwt>` header
//! into a populated [`SecurityContext`] when everything checks out, and into
//! an empty one otherwise. Accept/reject decisions belong to the
//! [`AuthorizationPolicy`](super::AuthorizationPolicy) and the extractors.

use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap};

use super::{AuthError, Principal, PrincipalLookup, SecurityContext, TokenCodec};

/// Scheme prefix of bearer credentials (case-sensitive, trailing space).
pub const BEARER_PREFIX: &str = "Bearer ";

/// Extract the raw token from the `Authorization` header.
///
/// Returns `None` when the header is absent, not visible ASCII, or does not
/// use the bearer scheme.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix(BEARER_PREFIX).map(str::trim)
}

#[derive(Clone)]
pub struct AuthenticationGate {
    codec: Arc<TokenCodec>,
    lookup: PrincipalLookup,
}

impl AuthenticationGate {
    pub fn new(codec: Arc<TokenCodec>, lookup: PrincipalLookup) -> Self {
        Self { codec, lookup }
    }

    /// Build the security context for a request.
    ///
    /// Never fails: a missing header, a bad token, or an unknown subject all
    /// produce an empty context.
    pub fn authenticate(&self, headers: &HeaderMap) -> SecurityContext {
        let mut context = SecurityContext::empty();

        let Some(token) = bearer_token(headers) else {
            return context;
        };

        match self.resolve(token) {
            Ok(principal) => {
                tracing::debug!(username = %principal.username, "Bearer token accepted");
                context.set_principal(principal);
            }
            Err(AuthError::InternalError(e)) => {
                tracing::error!(error = %e, "User store unavailable during authentication");
            }
            Err(e) => {
                tracing::debug!(reason = %e, code = e.error_code(), "Bearer token not accepted");
            }
        }
        context
    }

    fn resolve(&self, token: &str) -> Result<Principal, AuthError> {
        let username = self.codec.decode(token)?;
        self.lookup.resolve(&username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::ROLE_USER;
    use crate::models::{NewUser, User};
    use crate::storage::{InMemoryStore, StoreError, StoreResult, UserStore};
    use axum::http::HeaderValue;
    use chrono::Utc;
    use std::time::Duration;

    fn setup() -> (AuthenticationGate, Arc<TokenCodec>) {
        let store = InMemoryStore::new();
        store
            .insert_user(NewUser {
                username: "alice".to_string(),
                first_name: "Alice".to_string(),
                last_name: None,
                email: "alice@example.com".to_string(),
            })
            .unwrap();
        let codec = Arc::new(TokenCodec::new(b"gate-test-secret", Duration::from_secs(3600)));
        let gate = AuthenticationGate::new(codec.clone(), PrincipalLookup::new(Arc::new(store)));
        (gate, codec)
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn valid_token_populates_context() {
        let (gate, codec) = setup();
        let token = codec.encode("alice", Utc::now()).unwrap();

        let context = gate.authenticate(&headers_with(&format!("Bearer {token}")));
        let principal = context.principal().expect("principal should be set");
        assert_eq!(principal.username, "alice");
        assert!(principal.has_role(ROLE_USER));
    }

    #[test]
    fn missing_header_leaves_context_empty() {
        let (gate, _) = setup();
        assert!(!gate.authenticate(&HeaderMap::new()).is_authenticated());
    }

    #[test]
    fn basic_scheme_is_ignored() {
        let (gate, _) = setup();
        assert!(!gate.authenticate(&headers_with("Basic xyz")).is_authenticated());
    }

    #[test]
    fn prefix_is_case_sensitive() {
        let (gate, codec) = setup();
        let token = codec.encode("alice", Utc::now()).unwrap();
        assert!(!gate
            .authenticate(&headers_with(&format!("bearer {token}")))
            .is_authenticated());
    }

    #[test]
    fn invalid_token_leaves_context_empty() {
        let (gate, _) = setup();
        assert!(!gate
            .authenticate(&headers_with("Bearer not.a.token"))
            .is_authenticated());
    }

    #[test]
    fn unknown_subject_leaves_context_empty() {
        let (gate, codec) = setup();
        let token = codec.encode("ghost", Utc::now()).unwrap();
        assert!(!gate
            .authenticate(&headers_with(&format!("Bearer {token}")))
            .is_authenticated());
    }

    /// A user store whose backend is gone.
    struct UnavailableStore;

    impl UserStore for UnavailableStore {
        fn find_by_id(&self, _id: u64) -> StoreResult<Option<User>> {
            Err(StoreError::Poisoned)
        }

        fn find_by_username(&self, _username: &str) -> StoreResult<Option<User>> {
            Err(StoreError::Poisoned)
        }

        fn find_by_email(&self, _email: &str) -> StoreResult<Option<User>> {
            Err(StoreError::Poisoned)
        }

        fn insert_user(&self, _user: NewUser) -> StoreResult<User> {
            Err(StoreError::Poisoned)
        }

        fn update_user(&self, _user: &User) -> StoreResult<()> {
            Err(StoreError::Poisoned)
        }

        fn count_users(&self) -> StoreResult<usize> {
            Err(StoreError::Poisoned)
        }
    }

    #[test]
    fn store_failure_leaves_context_empty() {
        let codec = Arc::new(TokenCodec::new(b"gate-test-secret", Duration::from_secs(3600)));
        let lookup = PrincipalLookup::new(Arc::new(UnavailableStore));
        assert!(matches!(
            lookup.resolve("alice"),
            Err(AuthError::InternalError(_))
        ));

        let gate = AuthenticationGate::new(codec.clone(), lookup);
        let token = codec.encode("alice", Utc::now()).unwrap();
        assert!(!gate
            .authenticate(&headers_with(&format!("Bearer {token}")))
            .is_authenticated());
    }

    #[test]
    fn bearer_token_extraction() {
        assert_eq!(bearer_token(&headers_with("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers_with("Bearer  abc ")), Some("abc"));
        assert_eq!(bearer_token(&headers_with("Token abc")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
