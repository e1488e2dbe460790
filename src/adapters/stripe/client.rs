//! Stripe processor client.
//!
//! Implements the `ProcessorClient` port against Stripe's form-encoded REST
//! API. This layer authenticates and transports; it never interprets the
//! response beyond decoding the JSON body. TLS certificate validation is on
//! (reqwest default).

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::ports::{ProcessorClient, ProcessorResponse, TransportError};

/// Default API root; overridable for tests against a local stub.
pub const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";

/// Zero-side-effect read endpoint used to verify a secret key.
const VERIFY_ENDPOINT: &str = "balance";

/// Low-level Stripe API client.
pub struct StripeClient {
    http_client: reqwest::Client,
    api_base_url: String,
}

impl StripeClient {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_base_url: api_base_url.into(),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/v1/{}", self.api_base_url, endpoint)
    }

    async fn decode(response: reqwest::Response) -> Result<ProcessorResponse, TransportError> {
        let status = response.status().as_u16();
        let body = response
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;
        Ok(ProcessorResponse { status, body })
    }
}

impl Default for StripeClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

#[async_trait]
impl ProcessorClient for StripeClient {
    async fn request(
        &self,
        endpoint: &str,
        params: &[(String, String)],
        secret_key: &SecretString,
    ) -> Result<ProcessorResponse, TransportError> {
        let response = self
            .http_client
            .post(self.url(endpoint))
            .bearer_auth(secret_key.expose_secret())
            .form(params)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(endpoint, error = %e, "processor request failed in transit");
                TransportError::Network(e.to_string())
            })?;

        let decoded = Self::decode(response).await?;
        tracing::debug!(endpoint, status = decoded.status, "processor response");
        Ok(decoded)
    }

    async fn verify_key(&self, secret_key: &SecretString) -> Result<bool, TransportError> {
        let response = self
            .http_client
            .get(self.url(VERIFY_ENDPOINT))
            .bearer_auth(secret_key.expose_secret())
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(response.status().as_u16() == 200)
    }
}
