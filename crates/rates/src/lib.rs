//! Client for the upstream "latest rates" service.
//!
//! Each operation performs exactly one `GET <base_url>/<BASE>` with a bounded
//! timeout and never retries. Every failure comes back as a [`RatesError`].

mod error;

use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use currencypal_core::{
    format_amount, format_rate, round_money, round_rate, ConversionResult, CurrencyCode,
    RateEntry, RateTable,
};
use reqwest::Client;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, warn};

pub use error::RatesError;

pub const DEFAULT_RATES_URL: &str = "https://api.exchangerate-api.com/v4/latest";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Rate lookups the responder depends on.
pub trait RateSource: Send + Sync {
    async fn convert(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        amount: Decimal,
    ) -> Result<ConversionResult, RatesError>;

    /// Rates expressed as "1 <code> = X NGN". `None` means the default code set.
    async fn rates_to_base(&self, codes: Option<&[CurrencyCode]>)
        -> Result<RateTable, RatesError>;
}

#[derive(Debug, Clone)]
pub struct RateClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for RateClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_RATES_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl RateClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Blank URLs and zero or unparsable timeouts fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("CURRENCYPAL_RATES_URL")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_RATES_URL.to_string());
        let timeout = lookup("CURRENCYPAL_RATES_TIMEOUT_SECONDS")
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|seconds| *seconds > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        Self { base_url, timeout }
    }
}

#[derive(Debug, Clone)]
pub struct RateClient {
    http: Client,
    base_url: String,
}

impl RateClient {
    pub fn new(config: RateClientConfig) -> Result<Self, RatesError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|error| RatesError::Network(format!("failed to build HTTP client: {error}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `Ok(None)` when the body parsed but carried no `rates` object.
    async fn fetch_latest(
        &self,
        base: &CurrencyCode,
    ) -> Result<Option<HashMap<String, Decimal>>, RatesError> {
        let url = format!("{}/{}", self.base_url, base);
        debug!(url = %url, "fetching latest rates");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(RatesError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), base = %base, "rates service returned non-success status");
        }

        let body: Value = response.json().await.map_err(RatesError::from_transport)?;
        Ok(parse_rates(&body))
    }
}

impl RateSource for RateClient {
    async fn convert(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        amount: Decimal,
    ) -> Result<ConversionResult, RatesError> {
        let rates = self.fetch_latest(from).await?;
        let rate = rates
            .as_ref()
            .and_then(|table| table.get(to.as_str()))
            .copied()
            .filter(|rate| *rate > Decimal::ZERO)
            .ok_or_else(|| RatesError::CurrencyNotFound {
                from: from.clone(),
                to: to.clone(),
            })?;

        build_conversion(from, to, amount, rate)
    }

    async fn rates_to_base(
        &self,
        codes: Option<&[CurrencyCode]>,
    ) -> Result<RateTable, RatesError> {
        let rates = self
            .fetch_latest(&CurrencyCode::home())
            .await?
            .ok_or_else(|| RatesError::UpstreamShape("Failed to fetch rates".to_string()))?;

        let defaults;
        let codes = match codes {
            Some(codes) => codes,
            None => {
                defaults = CurrencyCode::defaults();
                defaults.as_slice()
            }
        };

        Ok(build_rate_table(&rates, codes))
    }
}

pub fn build_conversion(
    from: &CurrencyCode,
    to: &CurrencyCode,
    amount: Decimal,
    rate: Decimal,
) -> Result<ConversionResult, RatesError> {
    let converted = amount
        .checked_mul(rate)
        .ok_or_else(|| RatesError::AmountOutOfRange(amount.normalize().to_string()))?;

    let formatted_amount = format_amount(amount, from.as_str());
    let formatted_converted = format_amount(converted, to.as_str());
    let message = format!(
        "{formatted_amount} = {formatted_converted} 💱 (Rate: 1 {from} = {} {to})",
        format_rate(rate)
    );

    Ok(ConversionResult {
        from: from.clone(),
        to: to.clone(),
        amount,
        rate: round_rate(rate),
        converted: round_money(converted),
        formatted_amount,
        formatted_converted,
        message,
    })
}

/// Inverts home-based quotes. Codes missing upstream or quoted at zero are omitted.
pub fn build_rate_table(rates: &HashMap<String, Decimal>, codes: &[CurrencyCode]) -> RateTable {
    let home = CurrencyCode::home();
    let mut table = RateTable::new();

    for code in codes {
        let Some(quoted) = rates.get(code.as_str()).copied() else {
            debug!(code = %code, "currency absent from upstream rates");
            continue;
        };
        if quoted <= Decimal::ZERO {
            continue;
        }
        let Some(inverted) = Decimal::ONE.checked_div(quoted) else {
            continue;
        };

        table.insert(
            code.clone(),
            RateEntry {
                rate: round_money(inverted),
                formatted: format!("1 {code} = {}", format_amount(inverted, home.as_str())),
            },
        );
    }

    table
}

fn parse_rates(body: &Value) -> Option<HashMap<String, Decimal>> {
    let rates = body.get("rates")?.as_object()?;
    Some(
        rates
            .iter()
            .filter_map(|(code, value)| decimal_from_json(value).map(|rate| (code.clone(), rate)))
            .collect(),
    )
}

fn decimal_from_json(value: &Value) -> Option<Decimal> {
    let text = value.as_number()?.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}
