// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{AuthenticationGate, AuthorizationPolicy, PrincipalLookup, TokenCodec};
use crate::storage::{InMemoryStore, Store, UserStore};

/// Read-only authentication setup shared by every request.
pub struct AuthConfig {
    pub codec: Arc<TokenCodec>,
    pub gate: AuthenticationGate,
    pub policy: AuthorizationPolicy,
}

impl AuthConfig {
    pub fn new(codec: TokenCodec, users: Arc<dyn UserStore>, policy: AuthorizationPolicy) -> Self {
        let codec = Arc::new(codec);
        let gate = AuthenticationGate::new(codec.clone(), PrincipalLookup::new(users));
        Self {
            codec,
            gate,
            policy,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub auth_config: Arc<AuthConfig>,
}

impl AppState {
    pub fn new<S: Store + 'static>(
        store: Arc<S>,
        codec: TokenCodec,
        policy: AuthorizationPolicy,
    ) -> Self {
        let users: Arc<dyn UserStore> = store.clone();
        Self {
            store,
            auth_config: Arc::new(AuthConfig::new(codec, users, policy)),
        }
    }

    /// In-memory state, mainly for tests.
    pub fn in_memory(codec: TokenCodec, policy: AuthorizationPolicy) -> Self {
        Self::new(Arc::new(InMemoryStore::new()), codec, policy)
    }
}
