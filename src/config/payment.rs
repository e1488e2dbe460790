//! Payment configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Payment configuration: processor endpoint plus the fixed amounts the
/// operations use.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Processor API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// ISO currency code, lowercase, used for every operation
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Validation charge amount in minor units (`/chk`)
    #[serde(default = "default_charge_amount")]
    pub charge_amount_minor: i64,

    /// Invoice and payment-link amount in minor units (`/invoice`, `/link`)
    #[serde(default = "default_invoice_amount")]
    pub invoice_amount_minor: i64,

    /// Direct payment amount in minor units (`/paynow`)
    #[serde(default = "default_direct_amount")]
    pub direct_amount_minor: i64,

    /// Where a completed payment link sends the payer
    #[serde(default = "default_success_redirect_url")]
    pub success_redirect_url: String,
}

impl PaymentConfig {
    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.api_base_url.starts_with("http") {
            return Err(ValidationError::InvalidProcessorUrl);
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(ValidationError::InvalidCurrency);
        }
        if self.charge_amount_minor <= 0
            || self.invoice_amount_minor <= 0
            || self.direct_amount_minor <= 0
        {
            return Err(ValidationError::InvalidAmount);
        }
        if !self.success_redirect_url.starts_with("http") {
            return Err(ValidationError::InvalidRedirectUrl);
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            currency: default_currency(),
            charge_amount_minor: default_charge_amount(),
            invoice_amount_minor: default_invoice_amount(),
            direct_amount_minor: default_direct_amount(),
            success_redirect_url: default_success_redirect_url(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_currency() -> String {
    "aud".to_string()
}

fn default_charge_amount() -> i64 {
    50
}

fn default_invoice_amount() -> i64 {
    100
}

fn default_direct_amount() -> i64 {
    100
}

fn default_success_redirect_url() -> String {
    "https://example.com/success".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = PaymentConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.currency, "aud");
        assert_eq!(config.charge_amount_minor, 50);
        assert_eq!(config.invoice_amount_minor, 100);
        assert_eq!(config.direct_amount_minor, 100);
    }

    #[test]
    fn uppercase_currency_fails() {
        let config = PaymentConfig {
            currency: "AUD".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidCurrency)
        ));
    }

    #[test]
    fn non_positive_amount_fails() {
        let config = PaymentConfig {
            charge_amount_minor: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidAmount)
        ));
    }

    #[test]
    fn relative_redirect_fails() {
        let config = PaymentConfig {
            success_redirect_url: "/done".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidRedirectUrl)
        ));
    }
}
