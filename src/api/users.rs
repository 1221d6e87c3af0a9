// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    auth::{Auth, Principal},
    error::ApiError,
    models::{UpdateUserRequest, User},
    service::UserService,
    state::AppState,
};

/// Response for GET /users/me
#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    /// Token subject
    pub username: String,
    /// Granted authorities
    pub roles: Vec<String>,
}

impl From<Principal> for MeResponse {
    fn from(principal: Principal) -> Self {
        Self {
            username: principal.username,
            roles: principal.roles.into_iter().collect(),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct FindUserQuery {
    /// Exact username
    pub username: Option<String>,
}

/// Get the current authenticated user's identity and roles.
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current principal", body = MeResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn current_user(Auth(principal): Auth) -> Json<MeResponse> {
    Json(principal.into())
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = u64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<User>, ApiError> {
    let user = UserService::new(state.store.as_ref()).verify_if_exists(id)?;
    Ok(Json(user))
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(FindUserQuery),
    responses(
        (status = 200, description = "User", body = User),
        (status = 400, description = "Missing username"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "User not found")
    )
)]
pub async fn find_by_username(
    State(state): State<AppState>,
    Query(query): Query<FindUserQuery>,
) -> Result<Json<User>, ApiError> {
    let username = query
        .username
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Query parameter 'username' is required."))?;
    let user = UserService::new(state.store.as_ref()).find_by_username(&username)?;
    Ok(Json(user))
}

/// Update a user's names and e-mail.
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = u64, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Malformed body or mandatory field missing"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "User not found"),
        (status = 409, description = "E-mail already taken")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Path(id): Path<u64>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Json(request) = payload?;
    tracing::debug!(user_id = id, by = %principal.username, "Updating user");
    let user = UserService::new(state.store.as_ref()).update(id, request)?;
    Ok(Json(user))
}
