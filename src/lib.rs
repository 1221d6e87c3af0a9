// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! CB Administration - user and audit log backend
//!
//! A stateless REST service guarded by HMAC-signed JWT bearer tokens.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum) and OpenAPI document
//! - `auth` - Token codec, authentication gate and path policy
//! - `service` - Business rules for users and logs
//! - `storage` - User and log stores (in-memory, redb)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod service;
pub mod state;
pub mod storage;
