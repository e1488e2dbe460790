//! Command text parsing and the structural gates that go with it.
//!
//! Routing is by the first whitespace-bounded token, so `/pay` and `/paynow`
//! are distinct commands. Argument splitting is on single space boundaries
//! only: the remainder of the line after the command (and, for `/pay`, after
//! the invoice id) is one argument, even if it contains spaces.
//!
//! Structural checks — argument presence, the `sk_` key prefix, the `in_`
//! invoice prefix, card field count — all happen here, before any credential
//! lookup or processor call.

use thiserror::Error;

use super::card::{CardDetails, CardError};

/// Required prefix for processor secret keys.
pub const SECRET_KEY_PREFIX: &str = "sk_";

/// Required prefix for invoice identifiers.
pub const INVOICE_ID_PREFIX: &str = "in_";

/// Structural command failure, produced before anything runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The command needs an argument the user did not supply.
    #[error("missing argument: {what}")]
    MissingArgument {
        what: &'static str,
        usage: &'static str,
    },

    /// Secret keys must start with `sk_`.
    #[error("secret key must start with '{}'", SECRET_KEY_PREFIX)]
    InvalidKeyFormat,

    /// Invoice identifiers must start with `in_`.
    #[error("invoice id must start with '{}'", INVOICE_ID_PREFIX)]
    InvalidInvoiceId,

    /// The card argument did not parse.
    #[error(transparent)]
    Card(#[from] CardError),
}

/// A recognized, structurally valid command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `/start` — welcome text and command reference.
    Start,
    /// `/setkey <secret>` — register a processor secret key.
    SetKey { secret: String },
    /// `/au <card>` — tokenize only, no money movement.
    Authorize { card: CardDetails },
    /// `/chk <card>` — tokenize and charge a fixed amount.
    Charge { card: CardDetails },
    /// `/invoice` — create and finalize a fixed-amount invoice.
    CreateInvoice,
    /// `/pay <invoice_id> <card>` — pay a previously created invoice.
    PayInvoice { invoice_id: String, card: CardDetails },
    /// `/link` — create a reusable payment link.
    CreateLink,
    /// `/paynow <card>` — direct payment via a confirmed intent.
    DirectPay { card: CardDetails },
    /// Anything unrecognized; answered with the help text.
    Unknown,
}

impl Command {
    /// Parse one inbound message text.
    pub fn parse(text: &str) -> Result<Self, CommandError> {
        let text = text.trim();
        let (token, rest) = match text.split_once(' ') {
            Some((token, rest)) => (token, rest.trim()),
            None => (text, ""),
        };

        match token {
            "/start" => Ok(Command::Start),
            "/setkey" => {
                let secret = require(rest, "your secret key", "/setkey sk_xxxxx")?;
                if !secret.starts_with(SECRET_KEY_PREFIX) {
                    return Err(CommandError::InvalidKeyFormat);
                }
                Ok(Command::SetKey {
                    secret: secret.to_string(),
                })
            }
            "/au" => {
                let raw = require(rest, "card details", "/au 4242424242424242|12|25|123")?;
                Ok(Command::Authorize {
                    card: CardDetails::parse(raw)?,
                })
            }
            "/chk" => {
                let raw = require(rest, "card details", "/chk 4242424242424242|12|25|123")?;
                Ok(Command::Charge {
                    card: CardDetails::parse(raw)?,
                })
            }
            "/invoice" => Ok(Command::CreateInvoice),
            "/pay" => {
                let (invoice_id, raw_card) = rest.split_once(' ').ok_or(
                    CommandError::MissingArgument {
                        what: "an invoice id and card details",
                        usage: "/pay in_xxxxx 4242424242424242|12|25|123",
                    },
                )?;
                if !invoice_id.starts_with(INVOICE_ID_PREFIX) {
                    return Err(CommandError::InvalidInvoiceId);
                }
                Ok(Command::PayInvoice {
                    invoice_id: invoice_id.to_string(),
                    card: CardDetails::parse(raw_card.trim())?,
                })
            }
            "/link" => Ok(Command::CreateLink),
            "/paynow" => {
                let raw = require(rest, "card details", "/paynow 4242424242424242|12|25|123")?;
                Ok(Command::DirectPay {
                    card: CardDetails::parse(raw)?,
                })
            }
            _ => Ok(Command::Unknown),
        }
    }

    /// Stable name for logging. Never includes arguments, which may carry
    /// card numbers or secret keys.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "/start",
            Command::SetKey { .. } => "/setkey",
            Command::Authorize { .. } => "/au",
            Command::Charge { .. } => "/chk",
            Command::CreateInvoice => "/invoice",
            Command::PayInvoice { .. } => "/pay",
            Command::CreateLink => "/link",
            Command::DirectPay { .. } => "/paynow",
            Command::Unknown => "unknown",
        }
    }

    /// Whether this command runs a payment workflow and therefore requires a
    /// stored credential.
    pub fn requires_credential(&self) -> bool {
        !matches!(
            self,
            Command::Start | Command::SetKey { .. } | Command::Unknown
        )
    }
}

fn require<'a>(
    rest: &'a str,
    what: &'static str,
    usage: &'static str,
) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument { what, usage })
    } else {
        Ok(rest)
    }
}
