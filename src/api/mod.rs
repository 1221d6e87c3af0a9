// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{middleware, routing::get, Router};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::security_filter,
    models::{CreateLogRequest, Log, UpdateUserRequest, User},
    state::AppState,
};

pub mod client_ip;
pub mod docs;
pub mod index;
pub mod logs;
pub mod users;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index::index))
        .route("/swagger-resources", get(docs::swagger_resources))
        .route("/swagger-ui.html", get(docs::swagger_ui_redirect))
        .route("/users", get(users::find_by_username))
        .route("/users/me", get(users::current_user))
        .route(
            "/users/{id}",
            get(users::get_user).put(users::update_user),
        )
        .route("/logs", get(logs::list_logs).post(logs::create_log))
        .route("/logs/{id}", get(logs::get_log))
        .merge(SwaggerUi::new(docs::SWAGGER_UI_PATH).url(docs::API_DOCS_PATH, ApiDoc::openapi()))
        .layer(middleware::from_fn_with_state(
            state.auth_config.clone(),
            security_filter,
        ))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        index::index,
        docs::swagger_resources,
        docs::swagger_ui_redirect,
        users::current_user,
        users::get_user,
        users::find_by_username,
        users::update_user,
        logs::create_log,
        logs::get_log,
        logs::list_logs
    ),
    components(
        schemas(
            User,
            UpdateUserRequest,
            Log,
            CreateLogRequest,
            users::MeResponse,
            index::StatusResponse,
            docs::SwaggerResource
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Status", description = "Service status"),
        (name = "Docs", description = "API documentation"),
        (name = "Users", description = "User lookup and profile updates"),
        (name = "Logs", description = "Audit log entries")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthorizationPolicy, TokenCodec};
    use crate::config::DEFAULT_PUBLIC_PATHS;
    use std::time::Duration;

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let state = AppState::in_memory(
            TokenCodec::new(b"secret", Duration::from_secs(60)),
            AuthorizationPolicy::with_public_paths(DEFAULT_PUBLIC_PATHS.iter().copied()).unwrap(),
        );
        let app = router(state);
        let _ = app.into_make_service();
    }

    #[test]
    fn openapi_declares_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(doc.paths.paths.contains_key("/users/{id}"));
        assert!(doc.paths.paths.contains_key("/logs"));
    }
}
