// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::token::TokenError;

/// Authentication error type.
///
/// The gate never surfaces these to the client directly; it degrades every
/// failure to an unauthenticated context. Only the policy layer and the
/// extractors turn [`AuthError::AuthenticationRequired`] into a response.
#[derive(Debug)]
pub enum AuthError {
    /// Token is malformed, badly signed, or expired
    InvalidToken(TokenError),
    /// Token subject no longer resolves to a user
    PrincipalNotFound(String),
    /// Protected route reached without a principal
    AuthenticationRequired,
    /// Internal error
    InternalError(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidToken(_) => "invalid_token",
            AuthError::PrincipalNotFound(_) => "principal_not_found",
            AuthError::AuthenticationRequired => "authentication_required",
            AuthError::InternalError(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidToken(_)
            | AuthError::PrincipalNotFound(_)
            | AuthError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            AuthError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::InvalidToken(e) => write!(f, "Invalid bearer token: {e}"),
            AuthError::PrincipalNotFound(username) => {
                write!(f, "No user found for token subject '{username}'")
            }
            AuthError::AuthenticationRequired => write!(f, "Full authentication is required"),
            AuthError::InternalError(msg) => write!(f, "Internal authentication error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<TokenError> for AuthError {
    fn from(e: TokenError) -> Self {
        AuthError::InvalidToken(e)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Never echo token or user details back to an unauthenticated caller.
        let message = match &self {
            AuthError::InternalError(_) => "Internal authentication error".to_string(),
            AuthError::InvalidToken(_) | AuthError::PrincipalNotFound(_) => {
                AuthError::AuthenticationRequired.to_string()
            }
            other => other.to_string(),
        };
        let body = Json(AuthErrorBody {
            error: message,
            error_code: self.error_code().to_string(),
        });

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
