//! Payment objects as this system consumes them.
//!
//! The deserializable structs are minimal typed views of the processor's
//! response bodies: only the fields a workflow threads into its next step or
//! renders in a reply. Everything else in the body is ignored.
//!
//! The `*Outcome`-style structs at the bottom are the success payloads of the
//! orchestrated operations.

use serde::Deserialize;

/// Redacted card summary the processor returns after tokenization.
///
/// Every field is optional on the wire; replies render fallbacks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CardSummary {
    pub brand: Option<String>,
    pub last4: Option<String>,
    pub country: Option<String>,
    pub funding: Option<String>,
}

/// A tokenized card ("source"). Created per operation and consumed exactly
/// once by the step that follows.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentSource {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub card: CardSummary,
}

/// A created charge.
#[derive(Debug, Clone, Deserialize)]
pub struct Charge {
    pub id: String,
    pub status: String,
}

/// A created customer; only the id is threaded onward.
#[derive(Debug, Clone, Deserialize)]
pub struct Customer {
    pub id: String,
}

/// An invoice, as returned by creation, finalization, and payment.
#[derive(Debug, Clone, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub status: String,
    pub number: Option<String>,
    #[serde(default)]
    pub created: i64,
    pub hosted_invoice_url: Option<String>,
    #[serde(default)]
    pub amount_paid: i64,
    pub receipt_url: Option<String>,
    #[serde(default)]
    pub status_transitions: StatusTransitions,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusTransitions {
    pub paid_at: Option<i64>,
}

/// A created product; only the id is threaded onward.
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub id: String,
}

/// A created price; only the id is threaded onward.
#[derive(Debug, Clone, Deserialize)]
pub struct Price {
    pub id: String,
}

/// A reusable payment collection link.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentLink {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub created: i64,
}

/// A payment intent, before or after confirmation.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub charges: ChargeList,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChargeList {
    #[serde(default)]
    pub data: Vec<ChargeSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChargeSummary {
    pub id: String,
    pub receipt_url: Option<String>,
}

/// A payment method created from raw card fields.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentMethod {
    pub id: String,
    pub card: Option<CardSummary>,
}

// ── operation outcomes ──────────────────────────────────────────────────────

/// Result of an authorization: the card tokenized, nothing charged.
#[derive(Debug, Clone)]
pub struct CardAuthorization {
    pub status: String,
    pub card: CardSummary,
}

/// Result of a tokenize-then-charge operation.
#[derive(Debug, Clone)]
pub struct CardCharge {
    pub charge_id: String,
    pub status: String,
    pub card: CardSummary,
    pub amount_minor: i64,
    pub currency: String,
}

/// Result of the four-step invoice creation chain.
#[derive(Debug, Clone)]
pub struct CreatedInvoice {
    pub invoice: Invoice,
    pub amount_minor: i64,
    pub currency: String,
}

/// Result of paying a named invoice with a freshly tokenized card.
#[derive(Debug, Clone)]
pub struct PaidInvoice {
    pub invoice: Invoice,
    pub card: CardSummary,
    pub currency: String,
}

/// Result of the product → price → link chain.
#[derive(Debug, Clone)]
pub struct PaymentLinkCreated {
    pub link: PaymentLink,
    pub amount_minor: i64,
    pub currency: String,
}

/// Result of the intent → method → confirm chain.
#[derive(Debug, Clone)]
pub struct DirectPayment {
    pub intent: PaymentIntent,
    pub method: PaymentMethod,
    pub amount_minor: i64,
    pub currency: String,
}
