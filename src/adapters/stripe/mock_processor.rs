//! Mock processor client for testing.
//!
//! Serves scripted responses in order and records every call, so tests can
//! assert both what a workflow produced and exactly which endpoints it hit
//! (and, just as importantly, which it did not).

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::Value;

use crate::ports::{ProcessorClient, ProcessorResponse, TransportError};

/// Recorded call for assertions.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub endpoint: String,
    pub params: Vec<(String, String)>,
}

impl RecordedCall {
    /// Value of a form parameter, if the call carried it.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Default)]
struct MockState {
    /// Responses served in FIFO order, one per `request` call.
    script: VecDeque<Result<ProcessorResponse, TransportError>>,

    /// Every `request` call, in order.
    calls: Vec<RecordedCall>,

    /// What `verify_key` reports.
    verify_result: Option<Result<bool, TransportError>>,

    /// Number of `verify_key` calls.
    verify_calls: usize,
}

/// Scripted, recording implementation of `ProcessorClient`.
#[derive(Default)]
pub struct MockProcessor {
    state: Mutex<MockState>,
}

impl MockProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a 200 response with the given body.
    pub fn push_ok(&self, body: Value) {
        self.push_status(200, body);
    }

    /// Queue a response with an arbitrary status.
    pub fn push_status(&self, status: u16, body: Value) {
        self.state
            .lock()
            .unwrap()
            .script
            .push_back(Ok(ProcessorResponse { status, body }));
    }

    /// Queue a transport failure.
    pub fn push_transport_error(&self, error: TransportError) {
        self.state.lock().unwrap().script.push_back(Err(error));
    }

    /// Configure what `verify_key` reports.
    pub fn set_verify(&self, result: Result<bool, TransportError>) {
        self.state.lock().unwrap().verify_result = Some(result);
    }

    /// All recorded `request` calls, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Endpoints hit, in order.
    pub fn endpoints(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.endpoint).collect()
    }

    /// Number of `verify_key` calls made.
    pub fn verify_calls(&self) -> usize {
        self.state.lock().unwrap().verify_calls
    }
}

#[async_trait]
impl ProcessorClient for MockProcessor {
    async fn request(
        &self,
        endpoint: &str,
        params: &[(String, String)],
        _secret_key: &SecretString,
    ) -> Result<ProcessorResponse, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RecordedCall {
            endpoint: endpoint.to_string(),
            params: params.to_vec(),
        });
        state.script.pop_front().unwrap_or_else(|| {
            Err(TransportError::Network(format!(
                "mock: no scripted response for '{endpoint}'"
            )))
        })
    }

    async fn verify_key(&self, _secret_key: &SecretString) -> Result<bool, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.verify_calls += 1;
        state
            .verify_result
            .clone()
            .unwrap_or_else(|| Err(TransportError::Network("mock: verify unconfigured".into())))
    }
}
