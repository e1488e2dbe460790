//! Recording messenger for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::message::ChatId;
use crate::ports::{Messenger, SendError};

/// `Messenger` that records every sent message instead of delivering it.
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<(ChatId, String)>>,
    fail_sends: std::sync::atomic::AtomicBool,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent send fail, for fire-and-forget tests.
    pub fn fail_sends(&self) {
        self.fail_sends
            .store(true, std::sync::atomic::Ordering::SeqCst);
    }

    /// All recorded messages, in send order.
    pub fn sent(&self) -> Vec<(ChatId, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Texts only, in send order.
    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|(_, text)| text).collect()
    }

    /// The final message of the exchange, if any.
    pub fn last_text(&self) -> Option<String> {
        self.texts().pop()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), SendError> {
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        if self.fail_sends.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(SendError::Delivery("recording messenger set to fail".into()));
        }
        Ok(())
    }
}
