//! Card input parsing.
//!
//! Cards arrive as a single pipe-delimited string
//! (`number|exp_month|exp_year|cvc`). Parsing is purely structural: the
//! processor is the source of truth for whether the values are a real card,
//! so no digit, length, or expiry checks happen here.

use thiserror::Error;

/// Structural parse failure for card input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CardError {
    /// Fewer than four fields, or an empty field among the first four.
    #[error("card details must be formatted as number|exp_month|exp_year|cvc")]
    MalformedCard,
}

/// Raw card fields exactly as supplied by the user.
///
/// Values are forwarded to the processor verbatim; only the processor's
/// response says whether they are valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDetails {
    pub number: String,
    pub exp_month: String,
    pub exp_year: String,
    pub cvc: String,
}

impl CardDetails {
    /// Parse a `number|exp_month|exp_year|cvc` string.
    ///
    /// Fields beyond the fourth are ignored.
    pub fn parse(raw: &str) -> Result<Self, CardError> {
        let mut fields = raw.split('|').map(str::trim);

        let mut next = || fields.next().filter(|f| !f.is_empty());

        match (next(), next(), next(), next()) {
            (Some(number), Some(exp_month), Some(exp_year), Some(cvc)) => Ok(Self {
                number: number.to_string(),
                exp_month: exp_month.to_string(),
                exp_year: exp_year.to_string(),
                cvc: cvc.to_string(),
            }),
            _ => Err(CardError::MalformedCard),
        }
    }
}
