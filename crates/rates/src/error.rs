use currencypal_core::{CurrencyCode, ErrorBody};
use thiserror::Error;

/// Every way a rate lookup can fail. The display text is what users see.
#[derive(Debug, Error)]
pub enum RatesError {
    #[error("{}", timeout_text(.connect))]
    NetworkTimeout { connect: bool },

    #[error("Network error: {0}")]
    Network(String),

    #[error("{0}")]
    UpstreamShape(String),

    #[error("Failed to fetch exchange rate for {from} to {to}")]
    CurrencyNotFound { from: CurrencyCode, to: CurrencyCode },

    #[error("Amount {0} is too large to convert")]
    AmountOutOfRange(String),
}

impl RatesError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NetworkTimeout { .. } => "network_timeout",
            Self::Network(_) => "network_error",
            Self::UpstreamShape(_) => "upstream_shape",
            Self::CurrencyNotFound { .. } => "currency_not_found",
            Self::AmountOutOfRange(_) => "amount_out_of_range",
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody::new(self.to_string())
    }

    pub(crate) fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::NetworkTimeout {
                connect: error.is_connect(),
            }
        } else if error.is_decode() {
            Self::UpstreamShape(format!(
                "The exchange rate service returned an unexpected response: {error}"
            ))
        } else {
            Self::Network(error.to_string())
        }
    }
}

fn timeout_text(connect: &bool) -> &'static str {
    if *connect {
        "Connection timed out. The exchange rate service is not responding."
    } else {
        "Request timed out. The exchange rate service took too long to respond."
    }
}
