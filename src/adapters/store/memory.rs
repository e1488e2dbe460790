//! In-memory credential store for tests and ephemeral runs.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::message::UserId;
use crate::ports::{CredentialStore, StoreError};

/// `CredentialStore` backed by a process-local map.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    records: Mutex<HashMap<String, String>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn get(&self, user_id: &UserId) -> Result<Option<SecretString>, StoreError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .get(user_id.as_str())
            .map(|key| SecretString::new(key.clone())))
    }

    async fn set(&self, user_id: &UserId, secret_key: SecretString) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        records.insert(
            user_id.as_str().to_string(),
            secret_key.expose_secret().clone(),
        );
        Ok(())
    }
}
