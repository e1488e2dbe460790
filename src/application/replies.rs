//! Reply text builders.
//!
//! All user-facing strings live here, lightly HTML-marked-up for the chat
//! platform's HTML parse mode. The builders take the typed workflow outcomes
//! and never talk to the processor themselves.

use chrono::DateTime;

use crate::domain::card::CardError;
use crate::domain::command::{CommandError, SECRET_KEY_PREFIX};
use crate::domain::payment::{
    CardAuthorization, CardCharge, CardSummary, CreatedInvoice, DirectPayment, PaidInvoice,
    PaymentLinkCreated,
};

use super::orchestrator::{format_amount, WorkflowError};

/// `/start` welcome and command reference.
pub fn welcome() -> String {
    concat!(
        "🤖 <b>Tillbot</b>\n\n",
        "Run card and payment operations against your own Stripe account.\n\n",
        "<b>Commands:</b>\n",
        "🔑 <code>/setkey sk_xxx</code> - Set your Stripe secret key\n",
        "✅ <code>/au 4242424242424242|12|25|123</code> - Auth card only (no charge)\n",
        "💳 <code>/chk 4242424242424242|12|25|123</code> - Charge $0.50\n",
        "🧾 <code>/invoice</code> - Create $1.00 invoice\n",
        "💰 <code>/pay invoice_id 4242424242424242|12|25|123</code> - Pay invoice\n",
        "🔗 <code>/link</code> - Create $1.00 payment link\n",
        "⚡ <code>/paynow 4242424242424242|12|25|123</code> - Direct $1.00 payment\n\n",
        "<b>Card format:</b> number|month|year|cvc\n",
        "<i>Example: 4242424242424242|12|25|123</i>",
    )
    .to_string()
}

/// Fallback for unrecognized text.
pub fn help() -> String {
    concat!(
        "❓ <b>Unknown command</b>\n\n",
        "<b>Available commands:</b>\n",
        "🔑 <code>/setkey sk_xxx</code> - Set Stripe key\n",
        "✅ <code>/au card|month|year|cvc</code> - Auth only\n",
        "💳 <code>/chk card|month|year|cvc</code> - Charge $0.50\n",
        "🧾 <code>/invoice</code> - Create $1.00 invoice\n",
        "💰 <code>/pay invoice_id card|month|year|cvc</code> - Pay invoice\n",
        "🔗 <code>/link</code> - Create payment link\n",
        "⚡ <code>/paynow card|month|year|cvc</code> - Direct payment\n\n",
        "Type /start for more info.",
    )
    .to_string()
}

/// Structural command failures.
pub fn command_error(error: &CommandError) -> String {
    match error {
        CommandError::MissingArgument { what, usage } => {
            format!("❌ Please provide {what}.\n\n<b>Usage:</b> <code>{usage}</code>")
        }
        CommandError::InvalidKeyFormat => format!(
            "❌ Invalid key format. Key should start with '{SECRET_KEY_PREFIX}'"
        ),
        CommandError::InvalidInvoiceId => {
            "❌ Invalid invoice ID format. Should start with 'in_'".to_string()
        }
        CommandError::Card(CardError::MalformedCard) => concat!(
            "❌ Invalid card format.\n\n",
            "<b>Expected:</b> <code>number|month|year|cvc</code>\n",
            "<i>Example: 4242424242424242|12|25|123</i>",
        )
        .to_string(),
    }
}

/// Payment command issued without a stored credential.
pub fn missing_credential() -> String {
    concat!(
        "❌ <b>No key found!</b>\n\n",
        "Please set your key first using: <code>/setkey sk_xxxxx</code>",
    )
    .to_string()
}

pub fn key_saved() -> String {
    concat!(
        "✅ <b>Key saved successfully!</b>\n\n",
        "You can now run /au, /chk, /invoice, /pay, /link and /paynow.",
    )
    .to_string()
}

pub fn key_rejected() -> String {
    "❌ <b>Invalid key!</b>\n\nPlease check your key and try again.".to_string()
}

pub fn key_check_unavailable() -> String {
    "❌ Could not reach the payment processor to verify your key. Please try again.".to_string()
}

pub fn store_unavailable() -> String {
    "❌ Could not access key storage. Please try again.".to_string()
}

// ── progress notices ────────────────────────────────────────────────────────

pub fn processing_auth() -> String {
    "🔄 <b>Processing auth request...</b>".to_string()
}

pub fn processing_charge() -> String {
    "🔄 <b>Processing charge request...</b>".to_string()
}

pub fn creating_invoice(amount_minor: i64, currency: &str) -> String {
    format!(
        "🔄 <b>Creating {} invoice...</b>",
        format_amount(amount_minor, currency)
    )
}

pub fn processing_invoice_payment() -> String {
    "🔄 <b>Processing invoice payment...</b>".to_string()
}

pub fn creating_link(amount_minor: i64, currency: &str) -> String {
    format!(
        "🔄 <b>Creating {} payment link...</b>",
        format_amount(amount_minor, currency)
    )
}

pub fn processing_direct_payment(amount_minor: i64, currency: &str) -> String {
    format!(
        "🔄 <b>Processing {} payment...</b>",
        format_amount(amount_minor, currency)
    )
}

// ── workflow results ────────────────────────────────────────────────────────

pub fn auth_success(auth: &CardAuthorization) -> String {
    format!(
        "✅ <b>AUTH SUCCESSFUL</b>\n\n{}• Status: {}\n\n🔒 <i>Authorization completed - No charge made</i>",
        card_block(&auth.card),
        auth.status.to_uppercase(),
    )
}

pub fn charge_success(charge: &CardCharge) -> String {
    format!(
        "✅ <b>CHARGE SUCCESSFUL</b>\n\n{}• Status: {}\n• Amount: {}\n\n💰 <i>Charge completed successfully</i>",
        card_block(&charge.card),
        charge.status.to_uppercase(),
        format_amount(charge.amount_minor, &charge.currency),
    )
}

pub fn invoice_created(created: &CreatedInvoice) -> String {
    let invoice = &created.invoice;
    let mut text = format!(
        "✅ <b>INVOICE CREATED</b>\n\n📄 <b>Invoice Details:</b>\n• Invoice ID: <code>{}</code>\n• Amount: {}\n• Status: {}\n• Number: {}\n• Created: {}\n",
        invoice.id,
        format_amount(created.amount_minor, &created.currency),
        invoice.status.to_uppercase(),
        invoice.number.as_deref().unwrap_or("N/A"),
        format_timestamp(invoice.created),
    );
    if let Some(url) = &invoice.hosted_invoice_url {
        text.push_str(&format!("• Invoice URL: {url}\n"));
    }
    text.push_str(&format!(
        "\n💰 <b>To pay this invoice:</b>\n<code>/pay {} 4242424242424242|12|25|123</code>\n\n<i>Replace the card details with your actual card</i>",
        invoice.id
    ));
    text
}

pub fn invoice_paid(paid: &PaidInvoice) -> String {
    let invoice = &paid.invoice;
    let paid_at = invoice
        .status_transitions
        .paid_at
        .map(format_timestamp)
        .unwrap_or_else(|| "N/A".to_string());
    let mut text = format!(
        "✅ <b>INVOICE PAID SUCCESSFULLY</b>\n\n📄 <b>Invoice Details:</b>\n• Invoice ID: <code>{}</code>\n• Amount: {}\n• Status: {}\n• Paid: {}\n\n{}",
        invoice.id,
        format_amount(invoice.amount_paid, &paid.currency),
        invoice.status.to_uppercase(),
        paid_at,
        card_block(&paid.card),
    );
    if let Some(url) = &invoice.receipt_url {
        text.push_str(&format!("\n🧾 Receipt: {url}"));
    }
    text.push_str("\n\n💰 <i>Payment completed successfully!</i>");
    text
}

pub fn link_created(created: &PaymentLinkCreated) -> String {
    let link = &created.link;
    format!(
        "✅ <b>PAYMENT LINK CREATED</b>\n\n🔗 <b>Payment Link Details:</b>\n• Link ID: <code>{}</code>\n• Amount: {}\n• Status: {}\n• Created: {}\n\n🌐 <b>Payment URL:</b>\n{}\n\n🖱️ <i>Share the link to collect payment in the browser</i>",
        link.id,
        format_amount(created.amount_minor, &created.currency),
        if link.active { "Active" } else { "Inactive" },
        format_timestamp(link.created),
        link.url,
    )
}

pub fn direct_payment_success(payment: &DirectPayment) -> String {
    let intent = &payment.intent;
    let mut text = format!(
        "✅ <b>PAYMENT SUCCESSFUL</b>\n\n💰 <b>Payment Details:</b>\n• Payment ID: <code>{}</code>\n• Amount: {}\n• Status: {}\n• Created: {}\n\n",
        intent.id,
        format_amount(payment.amount_minor, &payment.currency),
        intent.status.to_uppercase(),
        format_timestamp(intent.created),
    );
    if let Some(card) = &payment.method.card {
        text.push_str(&card_block(card));
    }
    if let Some(charge) = intent.charges.data.first() {
        text.push_str(&format!("\n🧾 Charge ID: {}", charge.id));
        if let Some(url) = &charge.receipt_url {
            text.push_str(&format!("\n📄 Receipt: {url}"));
        }
    }
    text.push_str("\n\n⚡ <i>Direct payment completed successfully!</i>");
    text
}

/// Render a workflow failure under the operation's headline.
pub fn workflow_failed(headline: &str, error: &WorkflowError) -> String {
    format!("❌ <b>{headline}</b>\n\n{error}")
}

// ── shared fragments ────────────────────────────────────────────────────────

fn card_block(card: &CardSummary) -> String {
    format!(
        "💳 <b>Card Info:</b>\n• Brand: {}\n• Last4: {}\n• Country: {}\n• Funding: {}\n",
        card.brand.as_deref().unwrap_or("Unknown").to_uppercase(),
        card.last4.as_deref().unwrap_or("Unknown"),
        card.country.as_deref().unwrap_or("Unknown").to_uppercase(),
        capitalize(card.funding.as_deref().unwrap_or("unknown")),
    )
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn format_timestamp(unix_seconds: i64) -> String {
    DateTime::from_timestamp(unix_seconds, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}
