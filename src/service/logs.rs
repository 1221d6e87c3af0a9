// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use chrono::Utc;

use super::{is_blank, ServiceError, ServiceResult, UserService};
use crate::models::{CreateLogRequest, Log, NewLog};
use crate::storage::Store;

pub struct LogService<'a> {
    store: &'a dyn Store,
}

impl<'a> LogService<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Record a log entry for an existing user.
    ///
    /// The client timestamp is kept as `reported_at`; `timestamp` is the
    /// server clock at the time of the call.
    pub fn save(&self, request: CreateLogRequest, ip: Option<String>) -> ServiceResult<Log> {
        validate_mandatory_fields(&request)?;

        let CreateLogRequest {
            user,
            description,
            timestamp,
        } = request;
        let user_id = user.unwrap_or_default();
        UserService::new(self.store).verify_if_exists(user_id)?;

        let log = self.store.insert_log(NewLog {
            user_id,
            description: description.unwrap_or_default().trim().to_string(),
            reported_at: timestamp.unwrap_or_default().trim().to_string(),
            timestamp: Utc::now(),
            ip,
        })?;

        tracing::info!(log_id = log.id, user_id, "Log recorded");
        Ok(log)
    }

    pub fn find(&self, id: u64) -> ServiceResult<Log> {
        self.store
            .find_log(id)?
            .ok_or_else(|| ServiceError::NotFound(format!("Log not found for the given ID: {id}")))
    }

    /// Logs of one user, oldest first. Unknown users are reported as missing
    /// rather than as an empty list.
    pub fn list_for_user(&self, user_id: u64) -> ServiceResult<Vec<Log>> {
        UserService::new(self.store).verify_if_exists(user_id)?;
        Ok(self.store.list_logs_by_user(user_id)?)
    }
}

fn validate_mandatory_fields(request: &CreateLogRequest) -> ServiceResult<()> {
    let mut warnings = Vec::new();

    if request.user.is_none() {
        warnings.push("Field 'user' cannot be null.".to_string());
    }
    if is_blank(request.description.as_deref()) {
        warnings.push("Field 'description' cannot be blank.".to_string());
    }
    if is_blank(request.timestamp.as_deref()) {
        warnings.push("Field 'timestamp' cannot be blank.".to_string());
    }

    if warnings.is_empty() {
        Ok(())
    } else {
        tracing::debug!(?warnings, "Log validation failed");
        Err(ServiceError::Validation(warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use crate::storage::{InMemoryStore, UserStore};

    fn store_with_alice() -> (InMemoryStore, u64) {
        let store = InMemoryStore::new();
        let alice = store
            .insert_user(NewUser {
                username: "alice".to_string(),
                first_name: "Alice".to_string(),
                last_name: None,
                email: "alice@example.com".to_string(),
            })
            .unwrap();
        (store, alice.id)
    }

    fn request(user: Option<u64>, description: Option<&str>, timestamp: Option<&str>) -> CreateLogRequest {
        CreateLogRequest {
            user,
            description: description.map(str::to_string),
            timestamp: timestamp.map(str::to_string),
        }
    }

    #[test]
    fn save_records_entry() {
        let (store, alice) = store_with_alice();
        let service = LogService::new(&store);

        let log = service
            .save(
                request(Some(alice), Some("Signed in"), Some("2026-01-02T03:04:05Z")),
                Some("10.0.0.1".to_string()),
            )
            .unwrap();
        assert_eq!(log.user_id, alice);
        assert_eq!(log.description, "Signed in");
        assert_eq!(log.reported_at, "2026-01-02T03:04:05Z");
        assert_eq!(log.ip.as_deref(), Some("10.0.0.1"));

        assert_eq!(service.find(log.id).unwrap(), log);
    }

    #[test]
    fn save_lists_every_missing_field() {
        let (store, _) = store_with_alice();
        let service = LogService::new(&store);

        match service.save(request(None, Some(" "), None), None) {
            Err(ServiceError::Validation(warnings)) => {
                assert_eq!(warnings.len(), 3);
                assert!(warnings[0].contains("'user'"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn save_rejects_unknown_user() {
        let (store, _) = store_with_alice();
        let service = LogService::new(&store);
        assert!(matches!(
            service.save(request(Some(42), Some("x"), Some("now")), None),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn find_missing_log() {
        let (store, _) = store_with_alice();
        assert!(matches!(
            LogService::new(&store).find(7),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn list_for_user() {
        let (store, alice) = store_with_alice();
        let service = LogService::new(&store);

        assert!(service.list_for_user(alice).unwrap().is_empty());
        let first = service.save(request(Some(alice), Some("one"), Some("t1")), None).unwrap();
        let second = service.save(request(Some(alice), Some("two"), Some("t2")), None).unwrap();
        assert_eq!(service.list_for_user(alice).unwrap(), vec![first, second]);

        assert!(matches!(service.list_for_user(99), Err(ServiceError::NotFound(_))));
    }
}
