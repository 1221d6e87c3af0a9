// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;
use crate::storage::UserStore;

/// Service status with individual component checks.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub service: String,
    pub version: String,
    /// Overall status ("ok" or "degraded").
    pub status: String,
    /// Store reachability ("ok" or "unavailable").
    pub store: String,
}

/// Service status endpoint.
///
/// Public. Returns 200 when the store answers, 503 otherwise.
#[utoipa::path(
    get,
    path = "/",
    tag = "Status",
    responses(
        (status = 200, description = "Service is healthy", body = StatusResponse),
        (status = 503, description = "Store is unreachable", body = StatusResponse)
    )
)]
pub async fn index(State(state): State<AppState>) -> (StatusCode, Json<StatusResponse>) {
    let store_ok = match state.store.count_users() {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Store check failed");
            false
        }
    };

    let response = StatusResponse {
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: if store_ok { "ok" } else { "degraded" }.to_string(),
        store: if store_ok { "ok" } else { "unavailable" }.to_string(),
    };

    let status = if store_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
