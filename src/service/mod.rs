// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Business rules for users and logs.
//!
//! Services borrow a store for the duration of one call, validate input,
//! and translate storage failures into [`ServiceError`]s that the API layer
//! maps onto HTTP statuses.

pub mod logs;
pub mod users;

pub use logs::LogService;
pub use users::UserService;

use crate::storage::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// One entry per violated field rule.
    #[error("{}", .0.join(" "))]
    Validation(Vec<String>),

    #[error("{0}")]
    UniqueConstraint(String),

    #[error("{0}")]
    NotFound(String),

    #[error("storage failure: {0}")]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(what) => {
                ServiceError::UniqueConstraint(format!("{what} has already been taken"))
            }
            StoreError::NotFound(what) => ServiceError::NotFound(format!("{what} not found")),
            other => ServiceError::Store(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// `true` for `None`, empty, and whitespace-only values.
pub(crate) fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}
