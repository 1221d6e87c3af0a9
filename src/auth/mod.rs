// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Stateless JWT bearer authentication for the administration API.
//!
//! ## Auth Flow
//!
//! 1. An operator issues a token for an existing user
//!    (`cb-administration issue-token --username <name>`)
//! 2. Clients send `Authorization: Bearer <JWT>`
//! 3. For every request the server:
//!    - Checks the path against the [`AuthorizationPolicy`]; public paths
//!      skip authentication entirely
//!    - Verifies the JWT signature (shared HMAC secret) and expiry
//!    - Resolves `sub` to a user in the store and builds a [`Principal`]
//!      with role `ROLE_USER`
//!    - Rejects protected requests that end up without a principal
//!
//! ## Security
//!
//! - Nothing is kept between requests: no sessions, no cookies, no CSRF
//!   tokens
//! - Any failure while authenticating degrades to "unauthenticated"; the
//!   client only ever sees a generic 401
//! - No clock skew tolerance on `exp`

pub mod claims;
pub mod context;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod middleware;
pub mod policy;
pub mod principal;
pub mod token;

pub use claims::Claims;
pub use context::SecurityContext;
pub use error::AuthError;
pub use extractor::Auth;
pub use gate::{bearer_token, AuthenticationGate, BEARER_PREFIX};
pub use middleware::security_filter;
pub use policy::{AuthorizationPolicy, PolicyError, RouteAuthRule};
pub use principal::{Principal, PrincipalLookup, ROLE_USER};
pub use token::{TokenCodec, TokenError};
