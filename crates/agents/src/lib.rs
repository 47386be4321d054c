use std::slice;
use std::sync::Arc;
use std::time::Instant;

use currencypal_core::replies;
use currencypal_core::{classify_intent, ConversionForm, CurrencyCode, Intent, MultiRateReason};
use currencypal_observability::AppMetrics;
use currencypal_rates::{RateSource, RatesError};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Serialize)]
pub struct AgentReply {
    pub text: String,
    pub intent: Intent,
}

/// Stateless responder: one message in, one non-empty reply out.
#[derive(Clone)]
pub struct CurrencyAgent<R>
where
    R: RateSource,
{
    rates: Arc<R>,
    metrics: Arc<AppMetrics>,
}

impl<R> CurrencyAgent<R>
where
    R: RateSource,
{
    pub fn new(rates: Arc<R>, metrics: Arc<AppMetrics>) -> Self {
        Self { rates, metrics }
    }

    pub fn rates(&self) -> &R {
        &self.rates
    }

    pub fn metrics(&self) -> &Arc<AppMetrics> {
        &self.metrics
    }

    pub async fn process_message(&self, text: &str) -> String {
        self.reply(text).await.text
    }

    #[instrument(skip(self, text), fields(len = text.len()))]
    pub async fn reply(&self, text: &str) -> AgentReply {
        let started = Instant::now();
        self.metrics.inc_request();

        let intent = classify_intent(text);
        let reply_text = self.respond(&intent).await;

        self.metrics.observe_latency(started.elapsed());
        info!(intent = intent.label(), "message handled");

        AgentReply {
            text: reply_text,
            intent,
        }
    }

    async fn respond(&self, intent: &Intent) -> String {
        match intent {
            Intent::Empty => replies::empty_prompt(),
            Intent::Greeting => replies::greeting(),
            Intent::Help => replies::help(),
            Intent::Thanks => replies::thanks(),
            Intent::Convert {
                amount,
                from,
                to,
                form,
            } => self.convert_reply(*amount, from, to, *form).await,
            Intent::SingleRate { code } => self.single_rate_reply(code).await,
            Intent::MultiRate { reason } => self.rate_listing_reply(*reason).await,
            Intent::Unknown => {
                self.metrics.inc_fallback();
                replies::fallback()
            }
        }
    }

    async fn convert_reply(
        &self,
        amount: Decimal,
        from: &CurrencyCode,
        to: &CurrencyCode,
        form: ConversionForm,
    ) -> String {
        self.metrics.inc_conversion();

        match self.rates.convert(from, to, amount).await {
            Ok(result) => replies::conversion_success(&result),
            Err(error) => {
                self.record_upstream_error(&error);
                let example = match form {
                    ConversionForm::AssistToNaira => replies::naira_conversion_example(amount, from),
                    _ => replies::default_conversion_example(),
                };
                replies::conversion_failure(&error.to_string(), &example)
            }
        }
    }

    async fn single_rate_reply(&self, code: &CurrencyCode) -> String {
        self.metrics.inc_rate_lookup();

        match self.rates.rates_to_base(Some(slice::from_ref(code))).await {
            Ok(table) => match table.get(code) {
                Some(entry) => replies::single_rate_found(entry),
                None => replies::single_rate_missing(code),
            },
            Err(error) => {
                self.record_upstream_error(&error);
                replies::single_rate_failure(code, &error.to_string())
            }
        }
    }

    async fn rate_listing_reply(&self, reason: MultiRateReason) -> String {
        self.metrics.inc_rate_lookup();

        match self.rates.rates_to_base(None).await {
            Ok(table) => replies::rate_listing(&table),
            Err(error) => {
                self.record_upstream_error(&error);
                let message = error.to_string();
                match reason {
                    MultiRateReason::Listing => replies::rate_listing_failure(Some(&message)),
                    MultiRateReason::General => replies::rate_listing_failure(None),
                }
            }
        }
    }

    fn record_upstream_error(&self, error: &RatesError) {
        self.metrics.inc_upstream_error(error.kind());
        warn!(kind = error.kind(), error = %error, "rate lookup failed");
    }
}
