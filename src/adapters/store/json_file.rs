//! JSON-file credential store.
//!
//! The whole map is loaded on every read and rewritten on every mutation —
//! acceptable for the low write volume of key registration. Writes go
//! through a temporary file renamed into place, so a crashed write never
//! leaves a half-written store, and a mutex serializes writers so concurrent
//! registrations for different users cannot drop each other's records.
//!
//! Keys are stored in the clear, as the surrounding deployment's file
//! permissions are the protection boundary; `SecretString` keeps them out of
//! logs while in memory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;

use crate::domain::message::UserId;
use crate::ports::{CredentialStore, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserRecord {
    secret_key: String,
}

type CredentialMap = BTreeMap<String, UserRecord>;

/// Filesystem-backed credential store.
pub struct JsonFileCredentialStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileCredentialStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<CredentialMap, StoreError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(CredentialMap::new()),
            Err(e) => return Err(StoreError::Io(format!("failed to read store: {e}"))),
        };

        serde_json::from_str(&raw)
            .map_err(|e| StoreError::Corrupt(format!("failed to decode store: {e}")))
    }

    async fn persist(&self, map: &CredentialMap) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StoreError::Io(format!("failed to create store dir: {e}")))?;
            }
        }

        let encoded = serde_json::to_string_pretty(map)
            .map_err(|e| StoreError::Io(format!("failed to encode store: {e}")))?;

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, encoded)
            .await
            .map_err(|e| StoreError::Io(format!("failed to write store: {e}")))?;

        // Rename into place (atomic on Unix).
        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| StoreError::Io(format!("failed to replace store: {e}")))
    }
}

#[async_trait]
impl CredentialStore for JsonFileCredentialStore {
    async fn get(&self, user_id: &UserId) -> Result<Option<SecretString>, StoreError> {
        let map = self.load().await?;
        Ok(map
            .get(user_id.as_str())
            .map(|record| SecretString::new(record.secret_key.clone())))
    }

    async fn set(&self, user_id: &UserId, secret_key: SecretString) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut map = self.load().await?;
        map.insert(
            user_id.as_str().to_string(),
            UserRecord {
                secret_key: secret_key.expose_secret().clone(),
            },
        );
        self.persist(&map).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> JsonFileCredentialStore {
        JsonFileCredentialStore::new(dir.path().join("credentials.json"))
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.get(&UserId::new("alice")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let user = UserId::new("alice");

        store
            .set(&user, SecretString::new("sk_test_abc".into()))
            .await
            .unwrap();

        let key = store.get(&user).await.unwrap().unwrap();
        assert_eq!(key.expose_secret(), "sk_test_abc");
    }

    #[tokio::test]
    async fn set_overwrites_existing_record() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let user = UserId::new("alice");

        store
            .set(&user, SecretString::new("sk_test_old".into()))
            .await
            .unwrap();
        store
            .set(&user, SecretString::new("sk_test_new".into()))
            .await
            .unwrap();

        let key = store.get(&user).await.unwrap().unwrap();
        assert_eq!(key.expose_secret(), "sk_test_new");
    }

    #[tokio::test]
    async fn records_survive_a_new_store_instance() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        let user = UserId::new("alice");

        JsonFileCredentialStore::new(&path)
            .set(&user, SecretString::new("sk_test_abc".into()))
            .await
            .unwrap();

        let reopened = JsonFileCredentialStore::new(&path);
        let key = reopened.get(&user).await.unwrap().unwrap();
        assert_eq!(key.expose_secret(), "sk_test_abc");
    }

    #[tokio::test]
    async fn concurrent_writes_to_different_users_keep_both() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(store_in(&dir));

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .set(
                        &UserId::new(format!("user-{i}")),
                        SecretString::new(format!("sk_test_{i}")),
                    )
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        for i in 0..8 {
            let key = store
                .get(&UserId::new(format!("user-{i}")))
                .await
                .unwrap()
                .unwrap();
            assert_eq!(key.expose_secret(), &format!("sk_test_{i}"));
        }
    }

    #[tokio::test]
    async fn corrupted_file_is_reported_not_wiped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let store = JsonFileCredentialStore::new(&path);
        let result = store.get(&UserId::new("alice")).await;
        assert!(matches!(result, Err(StoreError::Corrupt(_))));

        // The broken file is left for an operator to inspect.
        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(raw, "{ not json");
    }
}
