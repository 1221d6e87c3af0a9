// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request-scoped security context.

use super::Principal;

/// Holds at most one principal for the lifetime of a single request.
///
/// Stored in the request extensions; created empty, populated at most once
/// by the authentication gate, dropped with the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityContext {
    principal: Option<Principal>,
}

impl SecurityContext {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Install the principal. Returns `false` and leaves the context
    /// untouched if one is already set.
    pub fn set_principal(&mut self, principal: Principal) -> bool {
        if self.principal.is_some() {
            return false;
        }
        self.principal = Some(principal);
        true
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }
}
