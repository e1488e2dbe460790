//! Payment processor port.
//!
//! The processor is consumed strictly as "perform one authenticated
//! form-encoded POST to a named endpoint, get back `{status, decoded body}`".
//! This layer does not interpret responses: a status of 200 is the only "ok"
//! signal it recognizes, and every other status is passed through for the
//! caller to classify.

use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::Value;
use thiserror::Error;

/// One decoded processor response: HTTP status plus JSON body, uninterpreted.
#[derive(Debug, Clone)]
pub struct ProcessorResponse {
    pub status: u16,
    pub body: Value,
}

impl ProcessorResponse {
    /// 200 is the only success status this system recognizes.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// The processor's error message, when the body carries one.
    pub fn error_message(&self) -> Option<&str> {
        self.body.get("error")?.get("message")?.as_str()
    }

    /// The processor's error code, when the body carries one.
    pub fn error_code(&self) -> Option<&str> {
        self.body.get("error")?.get("code")?.as_str()
    }
}

/// Transport-level failure: the request never produced a decodable response.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("processor request failed: {0}")]
    Network(String),

    #[error("processor response was not valid JSON: {0}")]
    Decode(String),
}

/// Port for the processor's REST surface.
#[async_trait]
pub trait ProcessorClient: Send + Sync {
    /// Execute one authenticated form-encoded POST against `endpoint`
    /// (path relative to the versioned API root, e.g. `"charges"` or
    /// `"invoices/in_123/pay"`).
    async fn request(
        &self,
        endpoint: &str,
        params: &[(String, String)],
        secret_key: &SecretString,
    ) -> Result<ProcessorResponse, TransportError>;

    /// Check a secret key against a zero-side-effect read endpoint.
    ///
    /// Reports success purely from a 200 status, independent of body shape.
    async fn verify_key(&self, secret_key: &SecretString) -> Result<bool, TransportError>;
}
