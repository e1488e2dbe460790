//! Credential store port.
//!
//! A keyed persistent mapping from user identity to processor secret key.
//! One credential per user, overwritten on re-registration, never deleted by
//! this system.

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

use crate::domain::message::UserId;

/// Errors from credential persistence.
///
/// A store failure is scoped to the triggering request; it never takes the
/// process down.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("credential storage I/O failure: {0}")]
    Io(String),

    #[error("credential storage is corrupted: {0}")]
    Corrupt(String),
}

/// Port for per-user credential persistence.
///
/// Implementations must keep concurrent writes to different users from
/// corrupting each other's records; no stronger transactional guarantee is
/// required.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up the stored secret key for a user.
    async fn get(&self, user_id: &UserId) -> Result<Option<SecretString>, StoreError>;

    /// Store (or overwrite) the secret key for a user.
    async fn set(&self, user_id: &UserId, secret_key: SecretString) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn CredentialStore) {}
    }
}
