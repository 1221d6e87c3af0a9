// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the entities and the request/response data structures
//! used by the REST API. All types derive `Serialize`, `Deserialize`, and
//! `ToSchema` for automatic JSON handling and OpenAPI documentation.
//!
//! ## Model Categories
//!
//! - **Users**: Administrative accounts, unique by username and email
//! - **Logs**: Audit entries written by clients on behalf of a user

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// User Models
// =============================================================================

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct User {
    /// Unique numeric identifier.
    pub id: u64,
    /// Login name. Unique and immutable.
    pub username: String,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Contact e-mail. Unique, compared case-insensitively.
    pub email: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields required to register a user in a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
}

/// Request to update a user's profile.
///
/// `first_name` and `email` are mandatory; missing and blank values are both
/// reported as validation errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

// =============================================================================
// Log Models
// =============================================================================

/// An audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Log {
    /// Unique numeric identifier.
    pub id: u64,
    /// The user this entry belongs to.
    pub user_id: u64,
    /// What happened.
    pub description: String,
    /// Timestamp reported by the client, stored verbatim.
    pub reported_at: String,
    /// When the server recorded the entry.
    pub timestamp: DateTime<Utc>,
    /// Address of the caller that submitted the entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

/// A log entry ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLog {
    pub user_id: u64,
    pub description: String,
    pub reported_at: String,
    pub timestamp: DateTime<Utc>,
    pub ip: Option<String>,
}

/// Request to record a log entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateLogRequest {
    /// ID of an existing user.
    #[serde(default)]
    pub user: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    /// Client-side timestamp of the event.
    #[serde(default)]
    pub timestamp: Option<String>,
}
