use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

/// Process-wide counters. Each increment is also forwarded to the `metrics`
/// facade so an installed exporter sees the same numbers.
#[derive(Debug, Default)]
pub struct AppMetrics {
    ask_requests_total: AtomicU64,
    plan_requests_total: AtomicU64,
    invalid_input_total: AtomicU64,
    backend_calls_total: AtomicU64,
    fallback_total: AtomicU64,
    composition_failures_total: AtomicU64,
    total_latency_millis: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub ask_requests_total: u64,
    pub plan_requests_total: u64,
    pub invalid_input_total: u64,
    pub backend_calls_total: u64,
    pub fallback_total: u64,
    pub composition_failures_total: u64,
    pub avg_latency_millis: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_ask(&self) {
        self.ask_requests_total.fetch_add(1, Ordering::Relaxed);
        counter!("ilm_ask_requests_total").increment(1);
    }

    pub fn inc_plan(&self) {
        self.plan_requests_total.fetch_add(1, Ordering::Relaxed);
        counter!("ilm_plan_requests_total").increment(1);
    }

    pub fn inc_invalid_input(&self) {
        self.invalid_input_total.fetch_add(1, Ordering::Relaxed);
        counter!("ilm_invalid_input_total").increment(1);
    }

    pub fn inc_backend_call(&self) {
        self.backend_calls_total.fetch_add(1, Ordering::Relaxed);
        counter!("ilm_backend_calls_total").increment(1);
    }

    pub fn inc_fallback(&self) {
        self.fallback_total.fetch_add(1, Ordering::Relaxed);
        counter!("ilm_fallback_total").increment(1);
    }

    pub fn inc_composition_failure(&self) {
        self.composition_failures_total
            .fetch_add(1, Ordering::Relaxed);
        counter!("ilm_composition_failures_total").increment(1);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_millis
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let asks = self.ask_requests_total.load(Ordering::Relaxed);
        let latency = self.total_latency_millis.load(Ordering::Relaxed);

        MetricsSnapshot {
            ask_requests_total: asks,
            plan_requests_total: self.plan_requests_total.load(Ordering::Relaxed),
            invalid_input_total: self.invalid_input_total.load(Ordering::Relaxed),
            backend_calls_total: self.backend_calls_total.load(Ordering::Relaxed),
            fallback_total: self.fallback_total.load(Ordering::Relaxed),
            composition_failures_total: self.composition_failures_total.load(Ordering::Relaxed),
            avg_latency_millis: if asks == 0 {
                0.0
            } else {
                latency as f64 / asks as f64
            },
        }
    }
}

pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}=info,ilm_api=info,ilm_agents=info,ilm_backend=info",
                service_name
            ))
        });

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .init();
    });
}
