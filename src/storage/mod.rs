// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistence for users and logs behind two narrow traits, [`UserStore`]
//! and [`LogStore`]. Everything above this module (services, the
//! authentication gate) only talks to the traits.
//!
//! ## Backends
//!
//! - [`InMemoryStore`] keeps everything in process memory. Used by tests and
//!   by deployments without `DATA_DIR`.
//! - [`DatabaseStore`] persists to an embedded redb file with secondary
//!   indexes on username, lowercase email and log owner.
//!
//! Both backends enforce username and email uniqueness themselves, so a
//! conflicting insert or update fails with [`StoreError::Conflict`] even if a
//! caller skipped the service-level check.
//!
//! Calls are synchronous; implementations synchronize internally and are
//! safe to share behind an `Arc`.

pub mod database;
pub mod memory;

pub use database::DatabaseStore;
pub use memory::InMemoryStore;

use crate::models::{Log, NewLog, NewUser, User};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("unique constraint violated: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("store lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// User lookups and mutations.
pub trait UserStore: Send + Sync {
    fn find_by_id(&self, id: u64) -> StoreResult<Option<User>>;

    /// Exact, case-sensitive username match.
    fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Case-insensitive e-mail match.
    fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Register a user and assign it the next id.
    fn insert_user(&self, user: NewUser) -> StoreResult<User>;

    /// Replace the mutable fields of an existing user.
    ///
    /// The username is immutable; the stored one is kept.
    fn update_user(&self, user: &User) -> StoreResult<()>;

    fn count_users(&self) -> StoreResult<usize>;
}

/// Audit log persistence.
pub trait LogStore: Send + Sync {
    fn insert_log(&self, log: NewLog) -> StoreResult<Log>;

    fn find_log(&self, id: u64) -> StoreResult<Option<Log>>;

    /// Logs of one user, oldest first.
    fn list_logs_by_user(&self, user_id: u64) -> StoreResult<Vec<Log>>;
}

/// A backend providing both users and logs.
pub trait Store: UserStore + LogStore {}

impl<T: UserStore + LogStore> Store for T {}

/// Normalized key for the e-mail uniqueness index.
pub(crate) fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}
