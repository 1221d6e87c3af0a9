// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Security filter for Axum.
//!
//! Runs in front of every route:
//!
//! 1. Public paths skip the gate and get an empty [`SecurityContext`].
//! 2. Other paths go through the [`AuthenticationGate`](super::AuthenticationGate).
//! 3. A protected path that is still unauthenticated is rejected with 401
//!    before any handler runs.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/protected", get(protected_handler))
//!     .layer(axum::middleware::from_fn_with_state(
//!         auth_config.clone(),
//!         security_filter,
//!     ));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::SecurityContext;
use crate::state::AuthConfig;

/// Authentication and authorization middleware function.
pub async fn security_filter(
    State(config): State<Arc<AuthConfig>>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();

    if !config.policy.requires_auth(&path) {
        request.extensions_mut().insert(SecurityContext::empty());
        return next.run(request).await;
    }

    let context = config.gate.authenticate(request.headers());
    if let Err(e) = config.policy.authorize(&path, &context) {
        tracing::debug!(%path, method = %request.method(), "Rejecting unauthenticated request");
        return e.into_response();
    }

    request.extensions_mut().insert(context);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthorizationPolicy, TokenCodec};
    use crate::models::NewUser;
    use crate::storage::{InMemoryStore, UserStore};
    use axum::{
        body::Body,
        http::{header::AUTHORIZATION, Request as HttpRequest, StatusCode},
        routing::get,
        Extension, Router,
    };
    use chrono::Utc;
    use std::time::Duration;
    use tower::ServiceExt;

    async fn whoami(Extension(context): Extension<SecurityContext>) -> String {
        context
            .principal()
            .map(|p| p.username.clone())
            .unwrap_or_else(|| "anonymous".to_string())
    }

    fn app() -> (Router, Arc<AuthConfig>) {
        let store = InMemoryStore::new();
        store
            .insert_user(NewUser {
                username: "alice".to_string(),
                first_name: "Alice".to_string(),
                last_name: None,
                email: "alice@example.com".to_string(),
            })
            .unwrap();

        let config = Arc::new(AuthConfig::new(
            TokenCodec::new(b"middleware-secret", Duration::from_secs(60)),
            Arc::new(store),
            AuthorizationPolicy::with_public_paths(["/"]).unwrap(),
        ));

        let router = Router::new()
            .route("/", get(whoami))
            .route("/private", get(whoami))
            .layer(axum::middleware::from_fn_with_state(
                config.clone(),
                security_filter,
            ));
        (router, config)
    }

    async fn call(router: Router, uri: &str, auth: Option<String>) -> (StatusCode, String) {
        let mut builder = HttpRequest::builder().uri(uri);
        if let Some(value) = auth {
            builder = builder.header(AUTHORIZATION, value);
        }
        let response = router
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn public_path_passes_without_token() {
        let (router, _) = app();
        let (status, body) = call(router, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn public_path_skips_the_gate() {
        let (router, config) = app();
        let token = config.codec.encode("alice", Utc::now()).unwrap();
        let (status, body) = call(router, "/", Some(format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn protected_path_rejects_missing_token() {
        let (router, _) = app();
        let (status, _) = call(router, "/private", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn protected_path_accepts_valid_token() {
        let (router, config) = app();
        let token = config.codec.encode("alice", Utc::now()).unwrap();
        let (status, body) = call(router, "/private", Some(format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "alice");
    }

    #[tokio::test]
    async fn unknown_route_is_still_protected() {
        let (router, _) = app();
        let (status, _) = call(router, "/nowhere", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
