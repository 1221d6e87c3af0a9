// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Documentation entry points kept at their historical locations.

use axum::{response::Redirect, Json};
use serde::Serialize;
use utoipa::ToSchema;

pub const SWAGGER_UI_PATH: &str = "/webjars/swagger-ui";
pub const API_DOCS_PATH: &str = "/v2/api-docs";

/// One documented API group.
#[derive(Debug, Serialize, ToSchema)]
pub struct SwaggerResource {
    pub name: String,
    pub url: String,
    pub swagger_version: String,
    pub location: String,
}

#[utoipa::path(
    get,
    path = "/swagger-resources",
    tag = "Docs",
    responses((status = 200, description = "Available API documents", body = [SwaggerResource]))
)]
pub async fn swagger_resources() -> Json<Vec<SwaggerResource>> {
    Json(vec![SwaggerResource {
        name: "default".to_string(),
        url: API_DOCS_PATH.to_string(),
        swagger_version: "3.1".to_string(),
        location: API_DOCS_PATH.to_string(),
    }])
}

#[utoipa::path(
    get,
    path = "/swagger-ui.html",
    tag = "Docs",
    responses((status = 307, description = "Redirect to the Swagger UI"))
)]
pub async fn swagger_ui_redirect() -> Redirect {
    Redirect::temporary(&format!("{SWAGGER_UI_PATH}/"))
}
