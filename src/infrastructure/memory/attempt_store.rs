//! In-Memory Attempt Store Implementation

use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;

use crate::application::ports::{AttemptError, AttemptStorePort};
use crate::domain::login::{LoginAttempt, LoginStage};

/// 内存登录尝试存储
pub struct InMemoryAttemptStore {
    attempts: DashMap<String, LoginAttempt>,
}

impl InMemoryAttemptStore {
    pub fn new() -> Self {
        Self {
            attempts: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl Default for InMemoryAttemptStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AttemptStorePort for InMemoryAttemptStore {
    fn insert(&self, attempt: LoginAttempt) -> Result<String, AttemptError> {
        let attempt_id = attempt.id.clone();
        if self.attempts.contains_key(&attempt_id) {
            return Err(AttemptError::AlreadyExists(attempt_id));
        }
        self.attempts.insert(attempt_id.clone(), attempt);
        tracing::info!(attempt_id = %attempt_id, "Login attempt registered");
        Ok(attempt_id)
    }

    fn get(&self, id: &str) -> Result<LoginAttempt, AttemptError> {
        self.attempts
            .get(id)
            .map(|a| a.clone())
            .ok_or_else(|| AttemptError::NotFound(id.to_string()))
    }

    fn set_stage(&self, id: &str, stage: LoginStage) -> Result<(), AttemptError> {
        let mut attempt = self
            .attempts
            .get_mut(id)
            .ok_or_else(|| AttemptError::NotFound(id.to_string()))?;
        attempt.stage = stage;
        attempt.last_activity = Utc::now();
        tracing::debug!(attempt_id = %id, "Login attempt stage updated");
        Ok(())
    }

    fn touch(&self, id: &str) {
        if let Some(mut attempt) = self.attempts.get_mut(id) {
            attempt.last_activity = Utc::now();
        }
    }

    fn remove(&self, id: &str) -> Result<LoginAttempt, AttemptError> {
        self.attempts
            .remove(id)
            .map(|(_, attempt)| {
                tracing::info!(attempt_id = %id, "Login attempt removed");
                attempt
            })
            .ok_or_else(|| AttemptError::NotFound(id.to_string()))
    }

    fn expired(&self, idle_timeout_secs: u64) -> Vec<String> {
        let now = Utc::now();
        let timeout = chrono::Duration::seconds(idle_timeout_secs as i64);

        self.attempts
            .iter()
            .filter_map(|entry| {
                let elapsed = now - entry.last_activity;
                if elapsed > timeout {
                    Some(entry.key().clone())
                } else {
                    None
                }
            })
            .collect()
    }

    fn list_all(&self) -> Vec<String> {
        self.attempts.iter().map(|e| e.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::login::PhoneNumber;

    fn phone_attempt() -> LoginAttempt {
        LoginAttempt::new_phone(PhoneNumber::new("+380501234567").unwrap(), 60)
    }

    #[test]
    fn test_attempt_lifecycle() {
        let store = InMemoryAttemptStore::new();
        let attempt = phone_attempt();
        let attempt_id = attempt.id.clone();

        // Insert
        let result = store.insert(attempt);
        assert!(result.is_ok());

        // Get
        let attempt = store.get(&attempt_id);
        assert!(attempt.is_ok());

        // Stage update
        let mut attempt = attempt.unwrap();
        attempt.require_password(None).unwrap();
        store.set_stage(&attempt_id, attempt.stage).unwrap();
        assert!(store.get(&attempt_id).unwrap().is_awaiting_password());

        // Remove
        assert!(store.remove(&attempt_id).is_ok());
        assert!(store.get(&attempt_id).is_err());
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let store = InMemoryAttemptStore::new();
        let attempt = phone_attempt();
        let dup = attempt.clone();
        store.insert(attempt).unwrap();
        assert!(matches!(
            store.insert(dup),
            Err(AttemptError::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_expired_selects_idle_attempts() {
        let store = InMemoryAttemptStore::new();
        let mut attempt = phone_attempt();
        attempt.last_activity = Utc::now() - chrono::Duration::seconds(120);
        let id = attempt.id.clone();
        store.insert(attempt).unwrap();

        assert_eq!(store.expired(60), vec![id.clone()]);
        assert!(store.expired(600).is_empty());

        store.touch(&id);
        assert!(store.expired(60).is_empty());
    }
}
