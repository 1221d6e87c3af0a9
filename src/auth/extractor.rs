// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for the authenticated principal.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(principal): Auth) -> impl IntoResponse {
//!     // principal is Principal
//! }
//! ```
//!
//! The extractor reads the [`SecurityContext`] installed by the security
//! filter. It never looks at headers itself, so a route mounted without the
//! filter is always unauthenticated.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AuthError, Principal, SecurityContext};

/// Extractor for authenticated principals.
///
/// Rejects with [`AuthError::AuthenticationRequired`] when the request
/// carries no principal.
///
/// # Example
///
/// ```rust,ignore
/// async fn get_user(
///     Auth(principal): Auth,
///     State(state): State<AppState>,
/// ) -> Result<Json<User>, ApiError> {
///     // principal.username is the token subject
/// }
/// ```
pub struct Auth(pub Principal);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SecurityContext>()
            .and_then(SecurityContext::principal)
            .cloned()
            .map(Auth)
            .ok_or(AuthError::AuthenticationRequired)
    }
}
