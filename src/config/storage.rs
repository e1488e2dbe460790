//! Credential storage configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Credential storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path of the JSON credential file
    #[serde(default = "default_credentials_path")]
    pub credentials_path: String,
}

impl StorageConfig {
    /// Validate storage configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.credentials_path.trim().is_empty() {
            return Err(ValidationError::InvalidStorePath);
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            credentials_path: default_credentials_path(),
        }
    }
}

fn default_credentials_path() -> String {
    "data/credentials.json".to_string()
}
