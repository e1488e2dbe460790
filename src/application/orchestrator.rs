//! Payment workflow orchestration.
//!
//! Every operation is a strict pipeline of processor calls: each step either
//! yields the typed object the next step needs or fails the whole operation,
//! tagged with the step that broke. Steps are attempted at most once, the
//! first non-200 response short-circuits everything after it, and nothing is
//! rolled back on the processor side — a customer or product created before a
//! later step fails is left behind (accepted gap).

use std::sync::Arc;

use secrecy::SecretString;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::PaymentConfig;
use crate::domain::card::CardDetails;
use crate::domain::payment::{
    CardAuthorization, CardCharge, Charge, CreatedInvoice, Customer, DirectPayment, Invoice,
    PaidInvoice, PaymentIntent, PaymentLink, PaymentLinkCreated, PaymentMethod, PaymentSource,
    Price, Product,
};
use crate::ports::{ProcessorClient, ProcessorResponse};

/// Fixed remediation text for accounts not enabled for direct card numbers.
pub const RAW_CARD_DATA_NOTICE: &str = "\
⚠️ Your Stripe account has restricted raw card data access.\n\n\
🔧 To enable card processing:\n\
1. Go to: https://dashboard.stripe.com/account/integration/settings\n\
2. Enable \"Process payments using raw card data\"\n\
3. Complete the security review if required\n\n\
📧 Or contact Stripe support to enable this feature.";

/// The processor call that failed, for failure tagging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStep {
    CreateSource,
    CreateCharge,
    CreateCustomer,
    CreateInvoiceItem,
    CreateInvoice,
    FinalizeInvoice,
    PayInvoice,
    CreateProduct,
    CreatePrice,
    CreatePaymentLink,
    CreatePaymentIntent,
    CreatePaymentMethod,
    ConfirmPaymentIntent,
}

impl WorkflowStep {
    pub fn label(&self) -> &'static str {
        match self {
            WorkflowStep::CreateSource => "Card validation",
            WorkflowStep::CreateCharge => "Charge",
            WorkflowStep::CreateCustomer => "Customer creation",
            WorkflowStep::CreateInvoiceItem => "Invoice item creation",
            WorkflowStep::CreateInvoice => "Invoice creation",
            WorkflowStep::FinalizeInvoice => "Invoice finalization",
            WorkflowStep::PayInvoice => "Invoice payment",
            WorkflowStep::CreateProduct => "Product creation",
            WorkflowStep::CreatePrice => "Price creation",
            WorkflowStep::CreatePaymentLink => "Payment link creation",
            WorkflowStep::CreatePaymentIntent => "Payment intent creation",
            WorkflowStep::CreatePaymentMethod => "Payment method creation",
            WorkflowStep::ConfirmPaymentIntent => "Payment confirmation",
        }
    }
}

impl std::fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The failure side of every workflow result.
#[derive(Debug, Clone, Error)]
pub enum WorkflowError {
    /// The account is configured to reject raw card data. User-actionable:
    /// the fixed remediation text tells them where to change it.
    #[error("{}", RAW_CARD_DATA_NOTICE)]
    RawCardDataRestricted,

    /// A processor call returned a non-success status, failed in transit, or
    /// produced an undecodable body.
    #[error("{step} failed: {message}")]
    Step {
        step: WorkflowStep,
        message: String,
        code: Option<String>,
    },
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Drives the multi-step payment operations against the processor.
pub struct PaymentOrchestrator {
    processor: Arc<dyn ProcessorClient>,
    config: PaymentConfig,
}

impl PaymentOrchestrator {
    pub fn new(processor: Arc<dyn ProcessorClient>, config: PaymentConfig) -> Self {
        Self { processor, config }
    }

    // ── workflows ───────────────────────────────────────────────────────────

    /// Authorize: tokenize only, no money movement. Never advances to a
    /// charge.
    pub async fn authorize(
        &self,
        secret_key: &SecretString,
        card: &CardDetails,
    ) -> WorkflowResult<CardAuthorization> {
        let source = self.tokenize(secret_key, card).await?;
        Ok(CardAuthorization {
            status: source.status,
            card: source.card,
        })
    }

    /// Charge: tokenize, then charge the fixed validation amount against the
    /// fresh source.
    pub async fn charge(
        &self,
        secret_key: &SecretString,
        card: &CardDetails,
    ) -> WorkflowResult<CardCharge> {
        let source = self.tokenize(secret_key, card).await?;

        let amount = self.config.charge_amount_minor;
        let charge: Charge = self
            .call(
                WorkflowStep::CreateCharge,
                "charges",
                vec![
                    ("amount".into(), amount.to_string()),
                    ("currency".into(), self.config.currency.clone()),
                    ("source".into(), source.id),
                    ("description".into(), "Card validation charge".into()),
                ],
                secret_key,
                "Charge failed",
            )
            .await?;

        Ok(CardCharge {
            charge_id: charge.id,
            status: charge.status,
            card: source.card,
            amount_minor: amount,
            currency: self.config.currency.clone(),
        })
    }

    /// Invoice creation: customer → line item → invoice → finalize.
    pub async fn create_invoice(
        &self,
        secret_key: &SecretString,
    ) -> WorkflowResult<CreatedInvoice> {
        let amount = self.config.invoice_amount_minor;

        let customer: Customer = self
            .call(
                WorkflowStep::CreateCustomer,
                "customers",
                vec![
                    ("email".into(), "tillbot-invoice-customer@example.com".into()),
                    ("description".into(), "Tillbot invoice customer".into()),
                ],
                secret_key,
                "Unknown error",
            )
            .await?;

        let _item: serde_json::Value = self
            .call(
                WorkflowStep::CreateInvoiceItem,
                "invoiceitems",
                vec![
                    ("customer".into(), customer.id.clone()),
                    ("amount".into(), amount.to_string()),
                    ("currency".into(), self.config.currency.clone()),
                    (
                        "description".into(),
                        format!(
                            "Tillbot invoice - {}",
                            format_amount(amount, &self.config.currency)
                        ),
                    ),
                ],
                secret_key,
                "Unknown error",
            )
            .await?;

        let invoice: Invoice = self
            .call(
                WorkflowStep::CreateInvoice,
                "invoices",
                vec![
                    ("customer".into(), customer.id),
                    // Finalization is an explicit step below.
                    ("auto_advance".into(), "false".into()),
                ],
                secret_key,
                "Unknown error",
            )
            .await?;

        let finalized: Invoice = self
            .call(
                WorkflowStep::FinalizeInvoice,
                &format!("invoices/{}/finalize", invoice.id),
                vec![],
                secret_key,
                "Unknown error",
            )
            .await?;

        Ok(CreatedInvoice {
            invoice: finalized,
            amount_minor: amount,
            currency: self.config.currency.clone(),
        })
    }

    /// Invoice payment: tokenize, then pay the named invoice with the fresh
    /// source. The invoice id's format is gated by the router before this
    /// runs.
    pub async fn pay_invoice(
        &self,
        secret_key: &SecretString,
        invoice_id: &str,
        card: &CardDetails,
    ) -> WorkflowResult<PaidInvoice> {
        let source = self.tokenize(secret_key, card).await?;

        let invoice: Invoice = self
            .call(
                WorkflowStep::PayInvoice,
                &format!("invoices/{invoice_id}/pay"),
                vec![("source".into(), source.id)],
                secret_key,
                "Unknown error",
            )
            .await?;

        Ok(PaidInvoice {
            invoice,
            card: source.card,
            currency: self.config.currency.clone(),
        })
    }

    /// Payment link: product → price → link. Never touches card data.
    pub async fn create_payment_link(
        &self,
        secret_key: &SecretString,
    ) -> WorkflowResult<PaymentLinkCreated> {
        let amount = self.config.invoice_amount_minor;

        let product: Product = self
            .call(
                WorkflowStep::CreateProduct,
                "products",
                vec![
                    ("name".into(), "Tillbot payment".into()),
                    ("description".into(), "Payment collected via Tillbot".into()),
                ],
                secret_key,
                "Unknown error",
            )
            .await?;

        let price: Price = self
            .call(
                WorkflowStep::CreatePrice,
                "prices",
                vec![
                    ("product".into(), product.id),
                    ("unit_amount".into(), amount.to_string()),
                    ("currency".into(), self.config.currency.clone()),
                ],
                secret_key,
                "Unknown error",
            )
            .await?;

        let link: PaymentLink = self
            .call(
                WorkflowStep::CreatePaymentLink,
                "payment_links",
                vec![
                    ("line_items[0][price]".into(), price.id),
                    ("line_items[0][quantity]".into(), "1".into()),
                    ("after_completion[type]".into(), "redirect".into()),
                    (
                        "after_completion[redirect][url]".into(),
                        self.config.success_redirect_url.clone(),
                    ),
                ],
                secret_key,
                "Unknown error",
            )
            .await?;

        Ok(PaymentLinkCreated {
            link,
            amount_minor: amount,
            currency: self.config.currency.clone(),
        })
    }

    /// Direct payment: intent → payment method from card → confirm with
    /// exactly that method's id.
    pub async fn direct_payment(
        &self,
        secret_key: &SecretString,
        card: &CardDetails,
    ) -> WorkflowResult<DirectPayment> {
        let amount = self.config.direct_amount_minor;

        let intent: PaymentIntent = self
            .call(
                WorkflowStep::CreatePaymentIntent,
                "payment_intents",
                vec![
                    ("amount".into(), amount.to_string()),
                    ("currency".into(), self.config.currency.clone()),
                    ("description".into(), "Tillbot payment".into()),
                    ("automatic_payment_methods[enabled]".into(), "true".into()),
                ],
                secret_key,
                "Unknown error",
            )
            .await?;

        // Raw card fields go to the processor here, so the same account
        // restriction classification as tokenize applies.
        let response = self
            .execute(
                WorkflowStep::CreatePaymentMethod,
                "payment_methods",
                vec![
                    ("type".into(), "card".into()),
                    ("card[number]".into(), card.number.clone()),
                    ("card[exp_month]".into(), card.exp_month.clone()),
                    ("card[exp_year]".into(), card.exp_year.clone()),
                    ("card[cvc]".into(), card.cvc.clone()),
                ],
                secret_key,
            )
            .await?;
        if !response.is_ok() {
            return Err(classify_card_failure(
                WorkflowStep::CreatePaymentMethod,
                &response,
                "Unknown error",
            ));
        }
        let method: PaymentMethod = decode(WorkflowStep::CreatePaymentMethod, response)?;

        let confirmed: PaymentIntent = self
            .call(
                WorkflowStep::ConfirmPaymentIntent,
                &format!("payment_intents/{}/confirm", intent.id),
                vec![("payment_method".into(), method.id.clone())],
                secret_key,
                "Unknown error",
            )
            .await?;

        Ok(DirectPayment {
            intent: confirmed,
            method,
            amount_minor: amount,
            currency: self.config.currency.clone(),
        })
    }

    // ── shared steps ────────────────────────────────────────────────────────

    /// Tokenize a card into a single-use source.
    async fn tokenize(
        &self,
        secret_key: &SecretString,
        card: &CardDetails,
    ) -> WorkflowResult<PaymentSource> {
        let response = self
            .execute(
                WorkflowStep::CreateSource,
                "sources",
                vec![
                    ("type".into(), "card".into()),
                    ("currency".into(), self.config.currency.clone()),
                    ("card[number]".into(), card.number.clone()),
                    ("card[exp_month]".into(), card.exp_month.clone()),
                    ("card[exp_year]".into(), card.exp_year.clone()),
                    ("card[cvc]".into(), card.cvc.clone()),
                ],
                secret_key,
            )
            .await?;

        if !response.is_ok() {
            return Err(classify_card_failure(
                WorkflowStep::CreateSource,
                &response,
                "Source creation failed",
            ));
        }
        decode(WorkflowStep::CreateSource, response)
    }

    /// One processor call, with transport failures folded into the step's
    /// failure.
    async fn execute(
        &self,
        step: WorkflowStep,
        endpoint: &str,
        params: Vec<(String, String)>,
        secret_key: &SecretString,
    ) -> WorkflowResult<ProcessorResponse> {
        self.processor
            .request(endpoint, &params, secret_key)
            .await
            .map_err(|e| {
                tracing::warn!(step = %step, endpoint, error = %e, "processor call failed in transit");
                WorkflowError::Step {
                    step,
                    message: e.to_string(),
                    code: None,
                }
            })
    }

    /// One processor call that must return 200, decoded into `T`.
    async fn call<T: DeserializeOwned>(
        &self,
        step: WorkflowStep,
        endpoint: &str,
        params: Vec<(String, String)>,
        secret_key: &SecretString,
        fallback: &str,
    ) -> WorkflowResult<T> {
        let response = self.execute(step, endpoint, params, secret_key).await?;
        if !response.is_ok() {
            tracing::warn!(step = %step, status = response.status, "processor call rejected");
            return Err(step_failure(step, &response, fallback));
        }
        decode(step, response)
    }
}

/// Format a minor-unit amount for descriptions and replies, e.g. `$0.50 AUD`.
pub fn format_amount(amount_minor: i64, currency: &str) -> String {
    format!(
        "${:.2} {}",
        amount_minor as f64 / 100.0,
        currency.to_uppercase()
    )
}

/// Decode a 200 body into the step's typed object.
fn decode<T: DeserializeOwned>(
    step: WorkflowStep,
    response: ProcessorResponse,
) -> WorkflowResult<T> {
    serde_json::from_value(response.body).map_err(|e| WorkflowError::Step {
        step,
        message: format!("unexpected response shape: {e}"),
        code: None,
    })
}

fn step_failure(step: WorkflowStep, response: &ProcessorResponse, fallback: &str) -> WorkflowError {
    WorkflowError::Step {
        step,
        message: response.error_message().unwrap_or(fallback).to_string(),
        code: response.error_code().map(str::to_string),
    }
}

/// Classify a failed card-ingestion response.
///
/// The fixed substrings are the processor's wording for accounts not enabled
/// to receive direct card numbers; that case is a user-actionable
/// configuration error, not a card-validity failure. Everything else keeps
/// the processor's own message. This is the only place the substring rule
/// lives.
fn classify_card_failure(
    step: WorkflowStep,
    response: &ProcessorResponse,
    fallback: &str,
) -> WorkflowError {
    if let Some(message) = response.error_message() {
        if message.contains("unsafe") || message.contains("raw card data") {
            return WorkflowError::RawCardDataRestricted;
        }
    }
    step_failure(step, response, fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::stripe::MockProcessor;
    use serde_json::json;

    fn key() -> SecretString {
        SecretString::new("sk_test_orchestrator".to_string())
    }

    fn card() -> CardDetails {
        CardDetails::parse("4242424242424242|12|25|123").unwrap()
    }

    fn orchestrator(mock: Arc<MockProcessor>) -> PaymentOrchestrator {
        PaymentOrchestrator::new(mock, PaymentConfig::default())
    }

    fn source_body(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "status": "chargeable",
            "card": {"brand": "visa", "last4": "4242", "country": "AU", "funding": "credit"}
        })
    }

    // ── tokenize classification ─────────────────────────────────────────────

    #[tokio::test]
    async fn authorize_tokenizes_and_stops() {
        let mock = Arc::new(MockProcessor::new());
        mock.push_ok(source_body("src_1"));

        let auth = orchestrator(Arc::clone(&mock))
            .authorize(&key(), &card())
            .await
            .unwrap();

        assert_eq!(auth.status, "chargeable");
        assert_eq!(auth.card.brand.as_deref(), Some("visa"));
        // No call after tokenize — authorization must never charge.
        assert_eq!(mock.endpoints(), vec!["sources"]);
    }

    #[tokio::test]
    async fn tokenize_sends_card_fields_and_currency() {
        let mock = Arc::new(MockProcessor::new());
        mock.push_ok(source_body("src_1"));

        orchestrator(Arc::clone(&mock))
            .authorize(&key(), &card())
            .await
            .unwrap();

        let call = &mock.calls()[0];
        assert_eq!(call.param("type"), Some("card"));
        assert_eq!(call.param("currency"), Some("aud"));
        assert_eq!(call.param("card[number]"), Some("4242424242424242"));
        assert_eq!(call.param("card[exp_month]"), Some("12"));
        assert_eq!(call.param("card[exp_year]"), Some("25"));
        assert_eq!(call.param("card[cvc]"), Some("123"));
    }

    #[tokio::test]
    async fn raw_card_data_restriction_is_classified() {
        for wording in [
            "Sending credit card numbers directly to the Stripe API is generally unsafe.",
            "Your account is blocked from providing raw card data to the API.",
        ] {
            let mock = Arc::new(MockProcessor::new());
            mock.push_status(402, json!({"error": {"message": wording}}));

            let err = orchestrator(Arc::clone(&mock))
                .authorize(&key(), &card())
                .await
                .unwrap_err();

            assert!(matches!(err, WorkflowError::RawCardDataRestricted));
        }
    }

    #[tokio::test]
    async fn other_tokenize_failures_keep_processor_message() {
        let mock = Arc::new(MockProcessor::new());
        mock.push_status(
            402,
            json!({"error": {"message": "Your card number is incorrect.", "code": "incorrect_number"}}),
        );

        let err = orchestrator(Arc::clone(&mock))
            .authorize(&key(), &card())
            .await
            .unwrap_err();

        match err {
            WorkflowError::Step {
                step,
                message,
                code,
            } => {
                assert_eq!(step, WorkflowStep::CreateSource);
                assert_eq!(message, "Your card number is incorrect.");
                assert_eq!(code.as_deref(), Some("incorrect_number"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn tokenize_failure_without_body_uses_fallback() {
        let mock = Arc::new(MockProcessor::new());
        mock.push_status(500, json!({}));

        let err = orchestrator(Arc::clone(&mock))
            .authorize(&key(), &card())
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Card validation failed: Source creation failed"
        );
    }

    // ── charge ──────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn charge_threads_source_into_charge_call() {
        let mock = Arc::new(MockProcessor::new());
        mock.push_ok(source_body("src_42"));
        mock.push_ok(json!({"id": "ch_1", "status": "succeeded"}));

        let charged = orchestrator(Arc::clone(&mock))
            .charge(&key(), &card())
            .await
            .unwrap();

        assert_eq!(charged.charge_id, "ch_1");
        assert_eq!(charged.amount_minor, 50);
        assert_eq!(mock.endpoints(), vec!["sources", "charges"]);

        let charge_call = &mock.calls()[1];
        assert_eq!(charge_call.param("source"), Some("src_42"));
        assert_eq!(charge_call.param("amount"), Some("50"));
        assert_eq!(charge_call.param("currency"), Some("aud"));
    }

    #[tokio::test]
    async fn charge_stops_when_tokenize_fails() {
        let mock = Arc::new(MockProcessor::new());
        mock.push_status(402, json!({"error": {"message": "declined"}}));

        let err = orchestrator(Arc::clone(&mock))
            .charge(&key(), &card())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::Step {
                step: WorkflowStep::CreateSource,
                ..
            }
        ));
        assert_eq!(mock.endpoints(), vec!["sources"]);
    }

    #[tokio::test]
    async fn charge_failure_is_tagged_with_charge_step() {
        let mock = Arc::new(MockProcessor::new());
        mock.push_ok(source_body("src_1"));
        mock.push_status(402, json!({"error": {"message": "Insufficient funds."}}));

        let err = orchestrator(Arc::clone(&mock))
            .charge(&key(), &card())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Charge failed: Insufficient funds.");
    }

    // ── invoice create ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn invoice_chain_threads_customer_and_finalizes() {
        let mock = Arc::new(MockProcessor::new());
        mock.push_ok(json!({"id": "cus_9"}));
        mock.push_ok(json!({"id": "ii_1"}));
        mock.push_ok(json!({"id": "in_1", "status": "draft"}));
        mock.push_ok(json!({
            "id": "in_1",
            "status": "open",
            "number": "TILL-0001",
            "created": 1700000000,
            "hosted_invoice_url": "https://invoice.example/in_1"
        }));

        let created = orchestrator(Arc::clone(&mock))
            .create_invoice(&key())
            .await
            .unwrap();

        assert_eq!(created.invoice.id, "in_1");
        assert_eq!(created.invoice.status, "open");
        assert_eq!(created.amount_minor, 100);
        assert_eq!(
            mock.endpoints(),
            vec![
                "customers",
                "invoiceitems",
                "invoices",
                "invoices/in_1/finalize"
            ]
        );

        let calls = mock.calls();
        assert_eq!(calls[1].param("customer"), Some("cus_9"));
        assert_eq!(calls[1].param("amount"), Some("100"));
        assert_eq!(calls[2].param("customer"), Some("cus_9"));
        assert_eq!(calls[2].param("auto_advance"), Some("false"));
    }

    #[tokio::test]
    async fn invoice_chain_short_circuits_on_item_failure() {
        let mock = Arc::new(MockProcessor::new());
        mock.push_ok(json!({"id": "cus_9"}));
        mock.push_status(400, json!({"error": {"message": "No such customer"}}));

        let err = orchestrator(Arc::clone(&mock))
            .create_invoice(&key())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Invoice item creation failed: No such customer");
        assert_eq!(mock.endpoints(), vec!["customers", "invoiceitems"]);
    }

    #[tokio::test]
    async fn invoice_chain_short_circuits_on_finalize_failure() {
        let mock = Arc::new(MockProcessor::new());
        mock.push_ok(json!({"id": "cus_9"}));
        mock.push_ok(json!({"id": "ii_1"}));
        mock.push_ok(json!({"id": "in_1", "status": "draft"}));
        mock.push_status(400, json!({"error": {"message": "Already finalized"}}));

        let err = orchestrator(Arc::clone(&mock))
            .create_invoice(&key())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::Step {
                step: WorkflowStep::FinalizeInvoice,
                ..
            }
        ));
        assert_eq!(mock.calls().len(), 4);
    }

    // ── invoice pay ─────────────────────────────────────────────────────────

    #[tokio::test]
    async fn pay_invoice_uses_fresh_source() {
        let mock = Arc::new(MockProcessor::new());
        mock.push_ok(source_body("src_7"));
        mock.push_ok(json!({
            "id": "in_5",
            "status": "paid",
            "amount_paid": 100,
            "status_transitions": {"paid_at": 1700000100},
            "receipt_url": "https://receipt.example/in_5"
        }));

        let paid = orchestrator(Arc::clone(&mock))
            .pay_invoice(&key(), "in_5", &card())
            .await
            .unwrap();

        assert_eq!(paid.invoice.status, "paid");
        assert_eq!(mock.endpoints(), vec!["sources", "invoices/in_5/pay"]);
        assert_eq!(mock.calls()[1].param("source"), Some("src_7"));
    }

    #[tokio::test]
    async fn pay_invoice_stops_when_tokenize_fails() {
        let mock = Arc::new(MockProcessor::new());
        mock.push_status(402, json!({"error": {"message": "expired card"}}));

        let err = orchestrator(Arc::clone(&mock))
            .pay_invoice(&key(), "in_5", &card())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Card validation failed: expired card");
        assert_eq!(mock.endpoints(), vec!["sources"]);
    }

    // ── payment link ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn link_chain_threads_product_and_price() {
        let mock = Arc::new(MockProcessor::new());
        mock.push_ok(json!({"id": "prod_1"}));
        mock.push_ok(json!({"id": "price_1"}));
        mock.push_ok(json!({
            "id": "plink_1",
            "url": "https://pay.example/plink_1",
            "active": true,
            "created": 1700000000
        }));

        let created = orchestrator(Arc::clone(&mock))
            .create_payment_link(&key())
            .await
            .unwrap();

        assert_eq!(created.link.url, "https://pay.example/plink_1");
        assert_eq!(mock.endpoints(), vec!["products", "prices", "payment_links"]);

        let calls = mock.calls();
        assert_eq!(calls[1].param("product"), Some("prod_1"));
        assert_eq!(calls[1].param("unit_amount"), Some("100"));
        assert_eq!(calls[2].param("line_items[0][price]"), Some("price_1"));
        assert_eq!(calls[2].param("line_items[0][quantity]"), Some("1"));
        assert_eq!(calls[2].param("after_completion[type]"), Some("redirect"));
        assert_eq!(
            calls[2].param("after_completion[redirect][url]"),
            Some("https://example.com/success")
        );
    }

    #[tokio::test]
    async fn link_chain_never_touches_card_data() {
        let mock = Arc::new(MockProcessor::new());
        mock.push_ok(json!({"id": "prod_1"}));
        mock.push_ok(json!({"id": "price_1"}));
        mock.push_ok(json!({"id": "plink_1", "url": "https://pay.example/p", "active": true}));

        orchestrator(Arc::clone(&mock))
            .create_payment_link(&key())
            .await
            .unwrap();

        for call in mock.calls() {
            assert!(
                call.params.iter().all(|(k, _)| !k.starts_with("card")),
                "unexpected card parameter in {}",
                call.endpoint
            );
        }
    }

    #[tokio::test]
    async fn link_chain_short_circuits_on_price_failure() {
        let mock = Arc::new(MockProcessor::new());
        mock.push_ok(json!({"id": "prod_1"}));
        mock.push_status(400, json!({"error": {"message": "Invalid currency"}}));

        let err = orchestrator(Arc::clone(&mock))
            .create_payment_link(&key())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Price creation failed: Invalid currency");
        assert_eq!(mock.endpoints(), vec!["products", "prices"]);
    }

    // ── direct payment ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn direct_payment_confirms_with_created_method() {
        let mock = Arc::new(MockProcessor::new());
        mock.push_ok(json!({"id": "pi_1", "status": "requires_payment_method", "created": 1700000000}));
        mock.push_ok(json!({
            "id": "pm_77",
            "card": {"brand": "mastercard", "last4": "4444", "country": "AU", "funding": "debit"}
        }));
        mock.push_ok(json!({
            "id": "pi_1",
            "status": "succeeded",
            "created": 1700000000,
            "charges": {"data": [{"id": "ch_9", "receipt_url": "https://receipt.example/ch_9"}]}
        }));

        let payment = orchestrator(Arc::clone(&mock))
            .direct_payment(&key(), &card())
            .await
            .unwrap();

        assert_eq!(payment.intent.status, "succeeded");
        assert_eq!(payment.method.id, "pm_77");
        assert_eq!(
            mock.endpoints(),
            vec!["payment_intents", "payment_methods", "payment_intents/pi_1/confirm"]
        );
        // Confirmation must use exactly the method that was just created.
        assert_eq!(mock.calls()[2].param("payment_method"), Some("pm_77"));
    }

    #[tokio::test]
    async fn direct_payment_requests_automatic_methods() {
        let mock = Arc::new(MockProcessor::new());
        mock.push_status(401, json!({"error": {"message": "Invalid API key"}}));

        let _ = orchestrator(Arc::clone(&mock))
            .direct_payment(&key(), &card())
            .await;

        let intent_call = &mock.calls()[0];
        assert_eq!(
            intent_call.param("automatic_payment_methods[enabled]"),
            Some("true")
        );
        assert_eq!(intent_call.param("amount"), Some("100"));
    }

    #[tokio::test]
    async fn direct_payment_classifies_method_restriction() {
        let mock = Arc::new(MockProcessor::new());
        mock.push_ok(json!({"id": "pi_1", "status": "requires_payment_method"}));
        mock.push_status(
            402,
            json!({"error": {"message": "Sending raw card data to the API is not enabled."}}),
        );

        let err = orchestrator(Arc::clone(&mock))
            .direct_payment(&key(), &card())
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::RawCardDataRestricted));
        assert_eq!(mock.endpoints(), vec!["payment_intents", "payment_methods"]);
    }

    #[tokio::test]
    async fn transport_failure_is_a_step_failure() {
        let mock = Arc::new(MockProcessor::new());
        mock.push_transport_error(crate::ports::TransportError::Network(
            "connection reset".into(),
        ));

        let err = orchestrator(Arc::clone(&mock))
            .charge(&key(), &card())
            .await
            .unwrap_err();

        match err {
            WorkflowError::Step { step, message, .. } => {
                assert_eq!(step, WorkflowStep::CreateSource);
                assert!(message.contains("connection reset"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(mock.endpoints(), vec!["sources"]);
    }

    #[tokio::test]
    async fn undecodable_success_body_is_a_step_failure() {
        let mock = Arc::new(MockProcessor::new());
        // 200 but missing the required `id`/`status` fields.
        mock.push_ok(json!({"object": "source"}));

        let err = orchestrator(Arc::clone(&mock))
            .authorize(&key(), &card())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::Step {
                step: WorkflowStep::CreateSource,
                ..
            }
        ));
    }

    #[test]
    fn amount_formatting() {
        assert_eq!(format_amount(50, "aud"), "$0.50 AUD");
        assert_eq!(format_amount(100, "aud"), "$1.00 AUD");
        assert_eq!(format_amount(1999, "cad"), "$19.99 CAD");
    }
}
