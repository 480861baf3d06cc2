use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};
use std::sync::LazyLock;

pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// Callback outcomes: success, rejected, connection_error, system_error
pub static CALLBACKS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new("zibal_relay_callbacks_total", "Gateway callbacks by outcome"),
        &["outcome"],
    )
    .unwrap()
});

pub static CALLBACK_LATENCY: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "zibal_relay_callback_duration_seconds",
            "Time spent verifying and forwarding one callback",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 15.0, 30.0]),
        &["outcome"],
    )
    .unwrap()
});

// Upstream failures by hop: verify, forward
pub static UPSTREAM_ERRORS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "zibal_relay_upstream_errors_total",
            "Failed outbound calls by hop and kind",
        ),
        &["hop", "kind"],
    )
    .unwrap()
});

pub static GATEWAY_REDIRECTS: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "zibal_relay_gateway_redirects_total",
        "Browsers sent on to the Zibal start page",
    )
    .unwrap()
});

/// Register all metrics with the registry. Safe to call more than once.
pub fn register_metrics() {
    let collectors: [Box<dyn prometheus::core::Collector>; 4] = [
        Box::new(CALLBACKS_TOTAL.clone()),
        Box::new(CALLBACK_LATENCY.clone()),
        Box::new(UPSTREAM_ERRORS.clone()),
        Box::new(GATEWAY_REDIRECTS.clone()),
    ];
    for collector in collectors {
        if let Err(e) = REGISTRY.register(collector) {
            tracing::debug!("metric already registered: {e}");
        }
    }
}
