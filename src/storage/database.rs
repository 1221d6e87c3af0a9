// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded user and log database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: user id → serialized User
//! - `username_index`: username → user id
//! - `email_index`: lowercase email → user id
//! - `logs`: log id → serialized Log
//! - `user_log_index`: composite key (user_id_be|log_id_be) → log id
//! - `sequences`: sequence name → last assigned id

use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};

use super::{email_key, LogStore, StoreError, StoreResult, UserStore};
use crate::models::{Log, NewLog, NewUser, User};

// =============================================================================
// Table Definitions
// =============================================================================

const USERS: TableDefinition<u64, &[u8]> = TableDefinition::new("users");

const USERNAME_INDEX: TableDefinition<&str, u64> = TableDefinition::new("username_index");

const EMAIL_INDEX: TableDefinition<&str, u64> = TableDefinition::new("email_index");

const LOGS: TableDefinition<u64, &[u8]> = TableDefinition::new("logs");

/// Key format: `user_id_be | log_id_be`, so a range scan over one user
/// yields its logs in insertion order.
const USER_LOG_INDEX: TableDefinition<&[u8], u64> = TableDefinition::new("user_log_index");

const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

const USER_SEQUENCE: &str = "users";
const LOG_SEQUENCE: &str = "logs";

// =============================================================================
// Index Key Helpers
// =============================================================================

fn make_log_index_key(user_id: u64, log_id: u64) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&user_id.to_be_bytes());
    key[8..].copy_from_slice(&log_id.to_be_bytes());
    key
}

/// Bump a sequence inside an open write transaction.
fn next_id(txn: &WriteTransaction, sequence: &str) -> StoreResult<u64> {
    let mut table = txn.open_table(SEQUENCES)?;
    let current = table.get(sequence)?.map(|v| v.value()).unwrap_or(0);
    let next = current + 1;
    table.insert(sequence, next)?;
    Ok(next)
}

// =============================================================================
// DatabaseStore
// =============================================================================

/// Durable store for users and logs.
pub struct DatabaseStore {
    db: Database,
}

impl DatabaseStore {
    /// Open (or create) the database at the given path.
    ///
    /// The parent directory must already exist.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(USERNAME_INDEX)?;
            let _ = write_txn.open_table(EMAIL_INDEX)?;
            let _ = write_txn.open_table(LOGS)?;
            let _ = write_txn.open_table(USER_LOG_INDEX)?;
            let _ = write_txn.open_table(SEQUENCES)?;
        }
        write_txn.commit()?;

        tracing::info!(path = %path.display(), "Opened user database");
        Ok(Self { db })
    }

    fn load_user(&self, id: u64) -> StoreResult<Option<User>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }
}

impl UserStore for DatabaseStore {
    fn find_by_id(&self, id: u64) -> StoreResult<Option<User>> {
        self.load_user(id)
    }

    fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let id = {
            let read_txn = self.db.begin_read()?;
            let index = read_txn.open_table(USERNAME_INDEX)?;
            let found = index.get(username)?.map(|v| v.value());
            found
        };
        match id {
            Some(id) => self.load_user(id),
            None => Ok(None),
        }
    }

    fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let key = email_key(email);
        let id = {
            let read_txn = self.db.begin_read()?;
            let index = read_txn.open_table(EMAIL_INDEX)?;
            let found = index.get(key.as_str())?.map(|v| v.value());
            found
        };
        match id {
            Some(id) => self.load_user(id),
            None => Ok(None),
        }
    }

    fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let email = email_key(&user.email);

        let write_txn = self.db.begin_write()?;
        let stored = {
            let mut username_index = write_txn.open_table(USERNAME_INDEX)?;
            if username_index.get(user.username.as_str())?.is_some() {
                return Err(StoreError::Conflict(format!("username '{}'", user.username)));
            }
            let mut email_index = write_txn.open_table(EMAIL_INDEX)?;
            if email_index.get(email.as_str())?.is_some() {
                return Err(StoreError::Conflict(format!("email '{}'", user.email)));
            }

            let id = next_id(&write_txn, USER_SEQUENCE)?;
            let stored = User {
                id,
                username: user.username,
                first_name: user.first_name,
                last_name: user.last_name,
                email: user.email,
                created_at: chrono::Utc::now(),
                updated_at: None,
            };
            let json = serde_json::to_vec(&stored)?;

            let mut users = write_txn.open_table(USERS)?;
            users.insert(id, json.as_slice())?;
            username_index.insert(stored.username.as_str(), id)?;
            email_index.insert(email.as_str(), id)?;
            stored
        };
        write_txn.commit()?;
        Ok(stored)
    }

    fn update_user(&self, user: &User) -> StoreResult<()> {
        let new_email = email_key(&user.email);

        let write_txn = self.db.begin_write()?;
        {
            let mut users = write_txn.open_table(USERS)?;

            // Read existing value and deserialize before mutating
            let existing_bytes = {
                let existing = users
                    .get(user.id)?
                    .ok_or_else(|| StoreError::NotFound(format!("User {}", user.id)))?;
                existing.value().to_vec()
            };
            let mut stored: User = serde_json::from_slice(&existing_bytes)?;
            let old_email = email_key(&stored.email);

            if old_email != new_email {
                let mut email_index = write_txn.open_table(EMAIL_INDEX)?;
                let owner = email_index.get(new_email.as_str())?.map(|v| v.value());
                if matches!(owner, Some(owner) if owner != user.id) {
                    return Err(StoreError::Conflict(format!("email '{}'", user.email)));
                }
                email_index.remove(old_email.as_str())?;
                email_index.insert(new_email.as_str(), user.id)?;
            }

            stored.first_name = user.first_name.clone();
            stored.last_name = user.last_name.clone();
            stored.email = user.email.clone();
            stored.updated_at = user.updated_at;

            let json = serde_json::to_vec(&stored)?;
            users.insert(user.id, json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn count_users(&self) -> StoreResult<usize> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        let mut count = 0;
        for entry in table.iter()? {
            entry?;
            count += 1;
        }
        Ok(count)
    }
}

impl LogStore for DatabaseStore {
    fn insert_log(&self, log: NewLog) -> StoreResult<Log> {
        let write_txn = self.db.begin_write()?;
        let stored = {
            let users = write_txn.open_table(USERS)?;
            if users.get(log.user_id)?.is_none() {
                return Err(StoreError::NotFound(format!("User {}", log.user_id)));
            }

            let id = next_id(&write_txn, LOG_SEQUENCE)?;
            let stored = Log {
                id,
                user_id: log.user_id,
                description: log.description,
                reported_at: log.reported_at,
                timestamp: log.timestamp,
                ip: log.ip,
            };
            let json = serde_json::to_vec(&stored)?;

            let mut logs = write_txn.open_table(LOGS)?;
            logs.insert(id, json.as_slice())?;
            let mut index = write_txn.open_table(USER_LOG_INDEX)?;
            let key = make_log_index_key(stored.user_id, id);
            index.insert(key.as_slice(), id)?;
            stored
        };
        write_txn.commit()?;
        Ok(stored)
    }

    fn find_log(&self, id: u64) -> StoreResult<Option<Log>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(LOGS)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn list_logs_by_user(&self, user_id: u64) -> StoreResult<Vec<Log>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(USER_LOG_INDEX)?;
        let logs = read_txn.open_table(LOGS)?;

        let start = make_log_index_key(user_id, 0);
        let end = make_log_index_key(user_id, u64::MAX);

        let mut results = Vec::new();
        for entry in index.range(start.as_slice()..=end.as_slice())? {
            let entry = entry?;
            let log_id = entry.1.value();
            if let Some(value) = logs.get(log_id)? {
                results.push(serde_json::from_slice(value.value())?);
            } else {
                tracing::warn!(log_id, user_id, "Dangling log index entry");
            }
        }
        Ok(results)
    }
}
