// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User lookups and profile updates.

use chrono::Utc;

use super::{is_blank, ServiceError, ServiceResult};
use crate::models::{UpdateUserRequest, User};
use crate::storage::{email_key, Store};

pub struct UserService<'a> {
    store: &'a dyn Store,
}

impl<'a> UserService<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Fetch a user by id or fail with [`ServiceError::NotFound`].
    pub fn verify_if_exists(&self, id: u64) -> ServiceResult<User> {
        self.store
            .find_by_id(id)?
            .ok_or_else(|| ServiceError::NotFound(format!("User not found for the given ID: {id}")))
    }

    pub fn find_by_username(&self, username: &str) -> ServiceResult<User> {
        self.store.find_by_username(username)?.ok_or_else(|| {
            ServiceError::NotFound(format!("User not found for the given username: {username}"))
        })
    }

    /// Apply a profile update.
    ///
    /// Order of checks: mandatory fields, existence, e-mail uniqueness.
    pub fn update(&self, id: u64, request: UpdateUserRequest) -> ServiceResult<User> {
        validate_mandatory_fields(&request)?;

        let current = self.verify_if_exists(id)?;
        let UpdateUserRequest {
            first_name,
            last_name,
            email,
        } = request;
        let first_name = first_name.unwrap_or_default().trim().to_string();
        let email = email.unwrap_or_default().trim().to_string();

        if self.email_has_already_been_taken(&current, &email)? {
            tracing::debug!(user_id = id, "Rejecting update: e-mail already taken");
            return Err(ServiceError::UniqueConstraint(
                "E-mail has already been taken".to_string(),
            ));
        }

        let updated = User {
            first_name,
            last_name: last_name
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            email,
            updated_at: Some(Utc::now()),
            ..current
        };
        self.store.update_user(&updated)?;

        tracing::info!(user_id = id, username = %updated.username, "User updated");
        Ok(updated)
    }

    /// Unchanged e-mails (ignoring case) are never a conflict, and neither
    /// is an index hit on the user being updated.
    fn email_has_already_been_taken(&self, current: &User, new: &str) -> ServiceResult<bool> {
        if email_key(&current.email) == email_key(new) {
            return Ok(false);
        }
        Ok(self
            .store
            .find_by_email(new)?
            .is_some_and(|owner| owner.id != current.id))
    }
}

fn validate_mandatory_fields(request: &UpdateUserRequest) -> ServiceResult<()> {
    let mut warnings = Vec::new();

    if is_blank(request.first_name.as_deref()) {
        warnings.push("Field 'first_name' cannot be blank.".to_string());
    }
    if is_blank(request.email.as_deref()) {
        warnings.push("Field 'email' cannot be blank.".to_string());
    }

    if warnings.is_empty() {
        Ok(())
    } else {
        tracing::debug!(?warnings, "User validation failed");
        Err(ServiceError::Validation(warnings))
    }
}
