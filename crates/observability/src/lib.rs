use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Default)]
pub struct AppMetrics {
    requests_total: AtomicU64,
    conversions_total: AtomicU64,
    rate_lookups_total: AtomicU64,
    upstream_errors_total: AtomicU64,
    fallback_total: AtomicU64,
    total_latency_millis: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub conversions_total: u64,
    pub rate_lookups_total: u64,
    pub upstream_errors_total: u64,
    pub fallback_total: u64,
    pub avg_latency_millis: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("currencypal_requests_total").increment(1);
    }

    pub fn inc_conversion(&self) {
        self.conversions_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("currencypal_conversions_total").increment(1);
    }

    pub fn inc_rate_lookup(&self) {
        self.rate_lookups_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("currencypal_rate_lookups_total").increment(1);
    }

    pub fn inc_upstream_error(&self, kind: &'static str) {
        self.upstream_errors_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("currencypal_upstream_errors_total", "kind" => kind).increment(1);
    }

    pub fn inc_fallback(&self) {
        self.fallback_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("currencypal_fallback_total").increment(1);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_millis
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let requests = self.requests_total.load(Ordering::Relaxed);
        let latency = self.total_latency_millis.load(Ordering::Relaxed);

        MetricsSnapshot {
            requests_total: requests,
            conversions_total: self.conversions_total.load(Ordering::Relaxed),
            rate_lookups_total: self.rate_lookups_total.load(Ordering::Relaxed),
            upstream_errors_total: self.upstream_errors_total.load(Ordering::Relaxed),
            fallback_total: self.fallback_total.load(Ordering::Relaxed),
            avg_latency_millis: if requests == 0 {
                0.0
            } else {
                latency as f64 / requests as f64
            },
        }
    }
}

pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}=info,currencypal_agents=info,currencypal_rates=info",
                service_name
            ))
        });

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(true)
            .init();
    });
}
