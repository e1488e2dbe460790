//! Command handling: the routing layer between inbound messages and the
//! orchestrator.
//!
//! Responsibilities: parse the command, enforce the credential gate before
//! any payment workflow, run the workflow, and render every outcome —
//! success or failure — as a reply. No error from the store, processor, or
//! messenger escapes this layer; each is scoped to the one inbound message.

use std::sync::Arc;

use secrecy::SecretString;

use crate::config::PaymentConfig;
use crate::domain::command::Command;
use crate::domain::message::{ChatId, InboundMessage, UserId};
use crate::ports::{CredentialStore, Messenger, ProcessorClient};

use super::orchestrator::PaymentOrchestrator;
use super::replies;

/// Handles one inbound message end to end.
pub struct CommandHandler {
    store: Arc<dyn CredentialStore>,
    processor: Arc<dyn ProcessorClient>,
    orchestrator: PaymentOrchestrator,
    messenger: Arc<dyn Messenger>,
    payment: PaymentConfig,
}

impl CommandHandler {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        processor: Arc<dyn ProcessorClient>,
        messenger: Arc<dyn Messenger>,
        payment: PaymentConfig,
    ) -> Self {
        let orchestrator = PaymentOrchestrator::new(Arc::clone(&processor), payment.clone());
        Self {
            store,
            processor,
            orchestrator,
            messenger,
            payment,
        }
    }

    /// Process one inbound message. Never returns an error: every failure is
    /// rendered as a reply (or logged, when even replying fails).
    pub async fn handle(&self, inbound: InboundMessage) {
        let InboundMessage {
            chat_id,
            user_id,
            text,
        } = inbound;

        // Message text may carry card numbers and secret keys; only the
        // parsed command name is logged.
        let command = match Command::parse(&text) {
            Ok(command) => command,
            Err(error) => {
                tracing::info!(user = %user_id, %error, "rejected malformed command");
                self.send(chat_id, replies::command_error(&error)).await;
                return;
            }
        };
        tracing::info!(user = %user_id, command = command.name(), "handling command");

        match command {
            Command::Start => self.send(chat_id, replies::welcome()).await,
            Command::Unknown => self.send(chat_id, replies::help()).await,
            Command::SetKey { secret } => self.set_key(chat_id, &user_id, secret).await,
            workflow => {
                let Some(secret) = self.require_credential(chat_id, &user_id).await else {
                    return;
                };
                self.run_workflow(chat_id, workflow, &secret).await;
            }
        }
    }

    /// Verify a key against the processor, and persist it only on success.
    async fn set_key(&self, chat_id: ChatId, user_id: &UserId, secret: String) {
        let secret = SecretString::new(secret);

        match self.processor.verify_key(&secret).await {
            Ok(true) => match self.store.set(user_id, secret).await {
                Ok(()) => {
                    tracing::info!(user = %user_id, "credential registered");
                    self.send(chat_id, replies::key_saved()).await;
                }
                Err(error) => {
                    tracing::error!(user = %user_id, %error, "credential persistence failed");
                    self.send(chat_id, replies::store_unavailable()).await;
                }
            },
            // Rejected key: the store is left exactly as it was.
            Ok(false) => {
                tracing::info!(user = %user_id, "credential rejected by processor");
                self.send(chat_id, replies::key_rejected()).await;
            }
            Err(error) => {
                tracing::warn!(user = %user_id, %error, "credential verification unreachable");
                self.send(chat_id, replies::key_check_unavailable()).await;
            }
        }
    }

    /// The credential gate: every payment workflow requires a stored key.
    async fn require_credential(&self, chat_id: ChatId, user_id: &UserId) -> Option<SecretString> {
        match self.store.get(user_id).await {
            Ok(Some(secret)) => Some(secret),
            Ok(None) => {
                self.send(chat_id, replies::missing_credential()).await;
                None
            }
            Err(error) => {
                tracing::error!(user = %user_id, %error, "credential lookup failed");
                self.send(chat_id, replies::store_unavailable()).await;
                None
            }
        }
    }

    async fn run_workflow(&self, chat_id: ChatId, command: Command, secret: &SecretString) {
        match command {
            Command::Authorize { card } => {
                self.send(chat_id, replies::processing_auth()).await;
                match self.orchestrator.authorize(secret, &card).await {
                    Ok(auth) => self.send(chat_id, replies::auth_success(&auth)).await,
                    Err(error) => {
                        self.send(chat_id, replies::workflow_failed("AUTH FAILED", &error))
                            .await
                    }
                }
            }
            Command::Charge { card } => {
                self.send(chat_id, replies::processing_charge()).await;
                match self.orchestrator.charge(secret, &card).await {
                    Ok(charge) => self.send(chat_id, replies::charge_success(&charge)).await,
                    Err(error) => {
                        self.send(chat_id, replies::workflow_failed("CHARGE FAILED", &error))
                            .await
                    }
                }
            }
            Command::CreateInvoice => {
                self.send(
                    chat_id,
                    replies::creating_invoice(
                        self.payment.invoice_amount_minor,
                        &self.payment.currency,
                    ),
                )
                .await;
                match self.orchestrator.create_invoice(secret).await {
                    Ok(created) => self.send(chat_id, replies::invoice_created(&created)).await,
                    Err(error) => {
                        self.send(
                            chat_id,
                            replies::workflow_failed("INVOICE CREATION FAILED", &error),
                        )
                        .await
                    }
                }
            }
            Command::PayInvoice { invoice_id, card } => {
                self.send(chat_id, replies::processing_invoice_payment())
                    .await;
                match self.orchestrator.pay_invoice(secret, &invoice_id, &card).await {
                    Ok(paid) => self.send(chat_id, replies::invoice_paid(&paid)).await,
                    Err(error) => {
                        self.send(chat_id, replies::workflow_failed("PAYMENT FAILED", &error))
                            .await
                    }
                }
            }
            Command::CreateLink => {
                self.send(
                    chat_id,
                    replies::creating_link(
                        self.payment.invoice_amount_minor,
                        &self.payment.currency,
                    ),
                )
                .await;
                match self.orchestrator.create_payment_link(secret).await {
                    Ok(created) => self.send(chat_id, replies::link_created(&created)).await,
                    Err(error) => {
                        self.send(
                            chat_id,
                            replies::workflow_failed("PAYMENT LINK CREATION FAILED", &error),
                        )
                        .await
                    }
                }
            }
            Command::DirectPay { card } => {
                self.send(
                    chat_id,
                    replies::processing_direct_payment(
                        self.payment.direct_amount_minor,
                        &self.payment.currency,
                    ),
                )
                .await;
                match self.orchestrator.direct_payment(secret, &card).await {
                    Ok(payment) => {
                        self.send(chat_id, replies::direct_payment_success(&payment))
                            .await
                    }
                    Err(error) => {
                        self.send(chat_id, replies::workflow_failed("PAYMENT FAILED", &error))
                            .await
                    }
                }
            }
            // Routed before this point.
            Command::Start | Command::SetKey { .. } | Command::Unknown => {}
        }
    }

    /// Fire-and-forget delivery: a failed send is logged, never propagated.
    async fn send(&self, chat_id: ChatId, text: String) {
        if let Err(error) = self.messenger.send_text(chat_id, &text).await {
            tracing::warn!(%chat_id, %error, "reply delivery failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::InMemoryCredentialStore;
    use crate::adapters::stripe::MockProcessor;
    use crate::adapters::telegram::RecordingMessenger;
    use secrecy::ExposeSecret;
    use serde_json::json;

    struct Harness {
        processor: Arc<MockProcessor>,
        store: Arc<InMemoryCredentialStore>,
        messenger: Arc<RecordingMessenger>,
        handler: CommandHandler,
    }

    fn harness() -> Harness {
        let processor = Arc::new(MockProcessor::new());
        let store = Arc::new(InMemoryCredentialStore::new());
        let messenger = Arc::new(RecordingMessenger::new());
        let handler = CommandHandler::new(
            Arc::clone(&store) as Arc<dyn CredentialStore>,
            Arc::clone(&processor) as Arc<dyn ProcessorClient>,
            Arc::clone(&messenger) as Arc<dyn Messenger>,
            PaymentConfig::default(),
        );
        Harness {
            processor,
            store,
            messenger,
            handler,
        }
    }

    fn inbound(text: &str) -> InboundMessage {
        InboundMessage {
            chat_id: ChatId::new(100),
            user_id: UserId::new("42"),
            text: text.to_string(),
        }
    }

    async fn register_key(h: &Harness, key: &str) {
        h.store
            .set(&UserId::new("42"), SecretString::new(key.to_string()))
            .await
            .unwrap();
    }

    fn source_body() -> serde_json::Value {
        json!({
            "id": "src_1",
            "status": "chargeable",
            "card": {"brand": "visa", "last4": "4242", "country": "AU", "funding": "credit"}
        })
    }

    #[tokio::test]
    async fn payment_commands_without_credential_issue_no_processor_calls() {
        for text in [
            "/au 4242424242424242|12|25|123",
            "/chk 4242424242424242|12|25|123",
            "/invoice",
            "/pay in_1 4242424242424242|12|25|123",
            "/link",
            "/paynow 4242424242424242|12|25|123",
        ] {
            let h = harness();
            h.handler.handle(inbound(text)).await;

            assert!(h.processor.calls().is_empty(), "processor called for {text}");
            assert_eq!(h.processor.verify_calls(), 0);
            let reply = h.messenger.last_text().unwrap();
            assert!(reply.contains("No key found"), "unexpected reply for {text}");
        }
    }

    #[tokio::test]
    async fn malformed_card_issues_no_processor_calls() {
        let h = harness();
        register_key(&h, "sk_test_valid").await;

        h.handler.handle(inbound("/au 4242|12")).await;

        assert!(h.processor.calls().is_empty());
        assert!(h.messenger.last_text().unwrap().contains("Invalid card format"));
    }

    #[tokio::test]
    async fn pay_with_bad_invoice_prefix_issues_no_processor_calls() {
        let h = harness();
        register_key(&h, "sk_test_valid").await;

        h.handler
            .handle(inbound("/pay bogus_1 4242424242424242|12|25|123"))
            .await;

        assert!(h.processor.calls().is_empty());
        assert!(h
            .messenger
            .last_text()
            .unwrap()
            .contains("Invalid invoice ID format"));
    }

    #[tokio::test]
    async fn setkey_persists_only_after_verification() {
        let h = harness();
        h.processor.set_verify(Ok(true));

        h.handler.handle(inbound("/setkey sk_test_good")).await;

        assert_eq!(h.processor.verify_calls(), 1);
        let stored = h.store.get(&UserId::new("42")).await.unwrap().unwrap();
        assert_eq!(stored.expose_secret(), "sk_test_good");
        assert!(h.messenger.last_text().unwrap().contains("Key saved"));
    }

    #[tokio::test]
    async fn rejected_key_leaves_prior_key_intact() {
        let h = harness();
        register_key(&h, "sk_test_prior").await;
        h.processor.set_verify(Ok(false));

        h.handler.handle(inbound("/setkey sk_test_bad")).await;

        let stored = h.store.get(&UserId::new("42")).await.unwrap().unwrap();
        assert_eq!(stored.expose_secret(), "sk_test_prior");
        assert!(h.messenger.last_text().unwrap().contains("Invalid key"));
    }

    #[tokio::test]
    async fn unreachable_verification_leaves_prior_key_intact() {
        let h = harness();
        register_key(&h, "sk_test_prior").await;
        h.processor.set_verify(Err(crate::ports::TransportError::Network(
            "timed out".into(),
        )));

        h.handler.handle(inbound("/setkey sk_test_new")).await;

        let stored = h.store.get(&UserId::new("42")).await.unwrap().unwrap();
        assert_eq!(stored.expose_secret(), "sk_test_prior");
        assert!(h
            .messenger
            .last_text()
            .unwrap()
            .contains("Could not reach the payment processor"));
    }

    #[tokio::test]
    async fn setkey_with_bad_prefix_never_reaches_processor() {
        let h = harness();

        h.handler.handle(inbound("/setkey pk_test_oops")).await;

        assert_eq!(h.processor.verify_calls(), 0);
        assert!(h.messenger.last_text().unwrap().contains("Invalid key format"));
    }

    #[tokio::test]
    async fn charge_flow_sends_progress_then_result() {
        let h = harness();
        register_key(&h, "sk_test_valid").await;
        h.processor.push_ok(source_body());
        h.processor
            .push_ok(json!({"id": "ch_1", "status": "succeeded"}));

        h.handler
            .handle(inbound("/chk 4242424242424242|12|25|123"))
            .await;

        let texts = h.messenger.texts();
        assert_eq!(texts.len(), 2);
        assert!(texts[0].contains("Processing charge request"));
        assert!(texts[1].contains("CHARGE SUCCESSFUL"));
        assert_eq!(h.processor.endpoints(), vec!["sources", "charges"]);
    }

    #[tokio::test]
    async fn auth_flow_never_charges() {
        let h = harness();
        register_key(&h, "sk_test_valid").await;
        h.processor.push_ok(source_body());

        h.handler
            .handle(inbound("/au 4242424242424242|12|25|123"))
            .await;

        assert_eq!(h.processor.endpoints(), vec!["sources"]);
        assert!(h.messenger.last_text().unwrap().contains("AUTH SUCCESSFUL"));
    }

    #[tokio::test]
    async fn workflow_failure_is_rendered_not_propagated() {
        let h = harness();
        register_key(&h, "sk_test_valid").await;
        h.processor
            .push_status(402, json!({"error": {"message": "Your card was declined."}}));

        h.handler
            .handle(inbound("/chk 4242424242424242|12|25|123"))
            .await;

        let reply = h.messenger.last_text().unwrap();
        assert!(reply.contains("CHARGE FAILED"));
        assert!(reply.contains("Your card was declined."));
    }

    #[tokio::test]
    async fn unknown_text_gets_help() {
        let h = harness();
        h.handler.handle(inbound("what is this")).await;
        assert!(h.messenger.last_text().unwrap().contains("Unknown command"));
        assert!(h.processor.calls().is_empty());
    }

    #[tokio::test]
    async fn failed_delivery_does_not_stop_the_workflow() {
        let h = harness();
        register_key(&h, "sk_test_valid").await;
        h.messenger.fail_sends();
        h.processor.push_ok(source_body());

        h.handler
            .handle(inbound("/au 4242424242424242|12|25|123"))
            .await;

        // The progress send failed, yet the processor call still happened.
        assert_eq!(h.processor.endpoints(), vec!["sources"]);
    }
}
