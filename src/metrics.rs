//! Prometheus metrics for the signal and supervision pipeline

use prometheus::{Counter, Encoder, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder};

/// Central metrics registry shared by the worker and the HTTP server.
pub struct Metrics {
    registry: Registry,

    // Signal pipeline
    pub signals_generated_total: Counter,
    pub signals_rejected_total: Counter,
    pub signals_admitted_total: Counter,
    pub signal_evaluation_duration_seconds: Histogram,

    // Position supervision
    pub positions_opened_total: Counter,
    pub positions_closed_total: Counter,
    pub close_rollbacks_total: Counter,
    pub open_positions: Gauge,
    pub scan_duration_seconds: Histogram,

    // Infrastructure
    pub database_connected: Gauge,
    pub cache_connected: Gauge,

    // HTTP (used by the core::http middleware)
    pub http_requests_total: Counter,
    pub http_requests_in_flight: Gauge,
    pub http_request_duration_seconds: Histogram,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let signals_generated_total = Counter::with_opts(Opts::new(
            "sentrix_signals_generated_total",
            "Signals produced by the scorer",
        ))?;
        let signals_rejected_total = Counter::with_opts(Opts::new(
            "sentrix_signals_rejected_total",
            "Signals rejected by the admission gate",
        ))?;
        let signals_admitted_total = Counter::with_opts(Opts::new(
            "sentrix_signals_admitted_total",
            "Signals accepted by the admission gate",
        ))?;
        let signal_evaluation_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "sentrix_signal_evaluation_duration_seconds",
            "Time spent computing indicators and scoring one symbol",
        ))?;

        let positions_opened_total = Counter::with_opts(Opts::new(
            "sentrix_positions_opened_total",
            "Positions opened from admitted signals",
        ))?;
        let positions_closed_total = Counter::with_opts(Opts::new(
            "sentrix_positions_closed_total",
            "Positions closed with a confirmed fill",
        ))?;
        let close_rollbacks_total = Counter::with_opts(Opts::new(
            "sentrix_close_rollbacks_total",
            "Close attempts rolled back after execution failure or timeout",
        ))?;
        let open_positions = Gauge::with_opts(Opts::new(
            "sentrix_open_positions",
            "Currently open positions",
        ))?;
        let scan_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "sentrix_scan_duration_seconds",
            "Duration of one supervision scan",
        ))?;

        let database_connected = Gauge::with_opts(Opts::new(
            "sentrix_database_connected",
            "1 when the Postgres store is connected",
        ))?;
        let cache_connected = Gauge::with_opts(Opts::new(
            "sentrix_cache_connected",
            "1 when the Redis cache is connected",
        ))?;

        let http_requests_total = Counter::with_opts(Opts::new(
            "sentrix_http_requests_total",
            "Total HTTP requests",
        ))?;
        let http_requests_in_flight = Gauge::with_opts(Opts::new(
            "sentrix_http_requests_in_flight",
            "HTTP requests currently being served",
        ))?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "sentrix_http_request_duration_seconds",
            "HTTP request duration",
        ))?;

        registry.register(Box::new(signals_generated_total.clone()))?;
        registry.register(Box::new(signals_rejected_total.clone()))?;
        registry.register(Box::new(signals_admitted_total.clone()))?;
        registry.register(Box::new(signal_evaluation_duration_seconds.clone()))?;
        registry.register(Box::new(positions_opened_total.clone()))?;
        registry.register(Box::new(positions_closed_total.clone()))?;
        registry.register(Box::new(close_rollbacks_total.clone()))?;
        registry.register(Box::new(open_positions.clone()))?;
        registry.register(Box::new(scan_duration_seconds.clone()))?;
        registry.register(Box::new(database_connected.clone()))?;
        registry.register(Box::new(cache_connected.clone()))?;
        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            signals_generated_total,
            signals_rejected_total,
            signals_admitted_total,
            signal_evaluation_duration_seconds,
            positions_opened_total,
            positions_closed_total,
            close_rollbacks_total,
            open_positions,
            scan_duration_seconds,
            database_connected,
            cache_connected,
            http_requests_total,
            http_requests_in_flight,
            http_request_duration_seconds,
        })
    }

    /// Export all metrics in the Prometheus text format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| prometheus::Error::Msg(format!("metrics encoding: {}", e)))
    }
}
