// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Audit log endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use super::client_ip::ClientIp;
use crate::{
    error::ApiError,
    models::{CreateLogRequest, Log},
    service::LogService,
    state::AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListLogsQuery {
    /// Owner of the entries
    pub user_id: Option<u64>,
}

/// Record a log entry on behalf of an existing user.
///
/// The caller address is taken from `X-Forwarded-For` when present.
#[utoipa::path(
    post,
    path = "/logs",
    tag = "Logs",
    security(("bearer_auth" = [])),
    request_body = CreateLogRequest,
    responses(
        (status = 201, description = "Log recorded", body = Log),
        (status = 400, description = "Malformed body or mandatory field missing"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "User not found")
    )
)]
pub async fn create_log(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    payload: Result<Json<CreateLogRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Log>), ApiError> {
    let Json(request) = payload?;
    let log = LogService::new(state.store.as_ref()).save(request, ip)?;
    Ok((StatusCode::CREATED, Json(log)))
}

#[utoipa::path(
    get,
    path = "/logs/{id}",
    tag = "Logs",
    security(("bearer_auth" = [])),
    params(("id" = u64, Path, description = "Log ID")),
    responses(
        (status = 200, description = "Log entry", body = Log),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Log not found")
    )
)]
pub async fn get_log(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Log>, ApiError> {
    Ok(Json(LogService::new(state.store.as_ref()).find(id)?))
}

#[utoipa::path(
    get,
    path = "/logs",
    tag = "Logs",
    security(("bearer_auth" = [])),
    params(ListLogsQuery),
    responses(
        (status = 200, description = "Entries of the user, oldest first", body = [Log]),
        (status = 400, description = "Missing user_id"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_logs(
    State(state): State<AppState>,
    Query(query): Query<ListLogsQuery>,
) -> Result<Json<Vec<Log>>, ApiError> {
    let user_id = query
        .user_id
        .ok_or_else(|| ApiError::bad_request("Query parameter 'user_id' is required."))?;
    Ok(Json(LogService::new(state.store.as_ref()).list_for_user(user_id)?))
}
