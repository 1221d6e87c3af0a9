// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Router over the redb-backed store.

use std::{sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body},
    http::{header::AUTHORIZATION, header::CONTENT_TYPE, Method, Request, StatusCode},
};
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;

use cb_administration::{
    api::router,
    auth::{AuthorizationPolicy, TokenCodec},
    config::{DATABASE_FILE, DEFAULT_PUBLIC_PATHS},
    models::NewUser,
    state::AppState,
    storage::{DatabaseStore, LogStore, UserStore},
};

const SECRET: &[u8] = b"database-flow-secret";

fn state_for(store: Arc<DatabaseStore>) -> AppState {
    AppState::new(
        store,
        TokenCodec::new(SECRET, Duration::from_secs(600)),
        AuthorizationPolicy::with_public_paths(DEFAULT_PUBLIC_PATHS.iter().copied()).unwrap(),
    )
}

#[tokio::test]
async fn logs_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DATABASE_FILE);
    let token = TokenCodec::new(SECRET, Duration::from_secs(600))
        .encode("carol", Utc::now())
        .unwrap();

    let user_id = {
        let store = Arc::new(DatabaseStore::open(&path).unwrap());
        let carol = store
            .insert_user(NewUser {
                username: "carol".to_string(),
                first_name: "Carol".to_string(),
                last_name: None,
                email: "carol@example.com".to_string(),
            })
            .unwrap();

        let request = Request::builder()
            .method(Method::POST)
            .uri("/logs")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "user": carol.id, "description": "Rotated keys", "timestamp": "t0" })
                    .to_string(),
            ))
            .unwrap();
        let response = router(state_for(store)).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        carol.id
    };

    let store = Arc::new(DatabaseStore::open(&path).unwrap());
    assert_eq!(store.list_logs_by_user(user_id).unwrap().len(), 1);

    let request = Request::builder()
        .uri(format!("/logs?user_id={user_id}"))
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = router(state_for(store)).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let logs: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(logs[0]["description"], "Rotated keys");
    assert!(logs[0].get("ip").is_none());
}
