//! Prometheus metrics

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Counter metric types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterMetric {
    /// Limit orders accepted by the exchange and tracked
    OrdersPlaced,
    /// Placements that produced no tracked order
    PlacementFailures,
    /// Orders converted to fill signals
    OrdersFilled,
    /// Orders cancelled, rejected or expired by the exchange
    OrdersClosedByExchange,
    /// Orders dropped after waiting too many bars
    OrdersTimedOut,
    /// Orders cancelled by the caller or at shutdown
    OrdersCancelled,
    /// Failed status queries
    PollErrors,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeMetric {
    /// Orders currently tracked
    PendingOrders,
}

/// Latency metric types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyMetric {
    /// Full poll/reconcile cycle
    PollCycle,
    /// Order placement round trip
    OrderPlacement,
}

fn counter_name(metric: CounterMetric) -> &'static str {
    match metric {
        CounterMetric::OrdersPlaced => "olm_orders_placed_total",
        CounterMetric::PlacementFailures => "olm_placement_failures_total",
        CounterMetric::OrdersFilled => "olm_orders_filled_total",
        CounterMetric::OrdersClosedByExchange => "olm_orders_closed_by_exchange_total",
        CounterMetric::OrdersTimedOut => "olm_orders_timed_out_total",
        CounterMetric::OrdersCancelled => "olm_orders_cancelled_total",
        CounterMetric::PollErrors => "olm_poll_errors_total",
    }
}

/// Increment a counter by one
pub fn increment(metric: CounterMetric) {
    increment_by(metric, 1);
}

/// Increment a counter by `value`
pub fn increment_by(metric: CounterMetric, value: u64) {
    metrics::counter!(counter_name(metric)).increment(value);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    let metric_name = match metric {
        GaugeMetric::PendingOrders => "olm_pending_orders",
    };
    metrics::gauge!(metric_name).set(value);
}

/// Record a latency measurement in milliseconds
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    let metric_name = match metric {
        LatencyMetric::PollCycle => "olm_poll_cycle_ms",
        LatencyMetric::OrderPlacement => "olm_order_placement_ms",
    };
    metrics::histogram!(metric_name).record(duration.as_secs_f64() * 1000.0);
}

/// Serve `/metrics` on the given port. Must be called inside a tokio runtime.
pub fn install_prometheus_exporter(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus exporter: {}", e))
}
