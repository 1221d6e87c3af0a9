// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory store for tests and ephemeral deployments.

use std::{
    collections::BTreeMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use chrono::Utc;

use super::{email_key, LogStore, StoreError, StoreResult, UserStore};
use crate::models::{Log, NewLog, NewUser, User};

#[derive(Default)]
struct Inner {
    users: BTreeMap<u64, User>,
    logs: BTreeMap<u64, Log>,
    last_user_id: u64,
    last_log_id: u64,
}

#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Inner>> {
        self.inner.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Inner>> {
        self.inner.write().map_err(|_| StoreError::Poisoned)
    }
}

impl Inner {
    fn email_owner(&self, email: &str) -> Option<&User> {
        let key = email_key(email);
        self.users.values().find(|user| email_key(&user.email) == key)
    }
}

impl UserStore for InMemoryStore {
    fn find_by_id(&self, id: u64) -> StoreResult<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.read()?.email_owner(email).cloned())
    }

    fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut inner = self.write()?;

        if inner.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict(format!("username '{}'", user.username)));
        }
        if inner.email_owner(&user.email).is_some() {
            return Err(StoreError::Conflict(format!("email '{}'", user.email)));
        }

        inner.last_user_id += 1;
        let stored = User {
            id: inner.last_user_id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            created_at: Utc::now(),
            updated_at: None,
        };
        inner.users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn update_user(&self, user: &User) -> StoreResult<()> {
        let mut inner = self.write()?;

        if let Some(owner) = inner.email_owner(&user.email) {
            if owner.id != user.id {
                return Err(StoreError::Conflict(format!("email '{}'", user.email)));
            }
        }

        let existing = inner
            .users
            .get_mut(&user.id)
            .ok_or_else(|| StoreError::NotFound(format!("User {}", user.id)))?;
        existing.first_name = user.first_name.clone();
        existing.last_name = user.last_name.clone();
        existing.email = user.email.clone();
        existing.updated_at = user.updated_at;
        Ok(())
    }

    fn count_users(&self) -> StoreResult<usize> {
        Ok(self.read()?.users.len())
    }
}

impl LogStore for InMemoryStore {
    fn insert_log(&self, log: NewLog) -> StoreResult<Log> {
        let mut inner = self.write()?;
        if !inner.users.contains_key(&log.user_id) {
            return Err(StoreError::NotFound(format!("User {}", log.user_id)));
        }

        inner.last_log_id += 1;
        let stored = Log {
            id: inner.last_log_id,
            user_id: log.user_id,
            description: log.description,
            reported_at: log.reported_at,
            timestamp: log.timestamp,
            ip: log.ip,
        };
        inner.logs.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn find_log(&self, id: u64) -> StoreResult<Option<Log>> {
        Ok(self.read()?.logs.get(&id).cloned())
    }

    fn list_logs_by_user(&self, user_id: u64) -> StoreResult<Vec<Log>> {
        Ok(self
            .read()?
            .logs
            .values()
            .filter(|log| log.user_id == user_id)
            .cloned()
            .collect())
    }
}
