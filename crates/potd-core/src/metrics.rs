//! Prometheus metrics for the scraper and the HTTP API.
//!
//! Each [`Metrics`] owns its own registry so independent instances (tests,
//! embedded servers) never collide on registration.

use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};

/// Outcome label values for `scraper_execution_total` / `scraper_duration_seconds`.
pub mod result {
    pub const SUCCESS: &str = "success";
    pub const SKIPPED: &str = "skipped";
    pub const FAILURE: &str = "failure";
}

/// Request type label values for `potd_requests_total`.
pub mod request {
    pub const TODAY: &str = "today";
    pub const DATE: &str = "date";
    pub const TRMNL: &str = "trmnl";
}

/// All metrics exported by the service.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    /// Scrape executions by result.
    pub scraper_execution: IntCounterVec,
    /// Scrape duration in seconds by result.
    pub scraper_duration: HistogramVec,
    /// Unix epoch milliseconds of the last successful scrape.
    pub scraper_last_success: IntGauge,
    /// Manual scrape triggers.
    pub scraper_triggered: IntCounter,
    /// Size of downloaded images in bytes.
    pub image_download_size: Histogram,
    /// API requests by type.
    pub requests: IntCounterVec,
}

impl Metrics {
    /// Create and register all metrics in a fresh registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let scraper_execution = IntCounterVec::new(
            Opts::new("scraper_execution_total", "Scraper executions by result"),
            &["result"],
        )?;
        let scraper_duration = HistogramVec::new(
            HistogramOpts::new("scraper_duration_seconds", "Scraper execution time")
                .buckets(vec![0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
            &["result"],
        )?;
        let scraper_last_success = IntGauge::new(
            "scraper_last_success_timestamp",
            "Epoch milliseconds of the last successful scrape",
        )?;
        let scraper_triggered =
            IntCounter::new("scraper_triggered_total", "Manually triggered scrapes")?;
        let image_download_size = Histogram::with_opts(
            HistogramOpts::new(
                "image_download_size_bytes",
                "Size of downloaded images in bytes",
            )
            .buckets(prometheus::exponential_buckets(16_384.0, 4.0, 8)?),
        )?;
        let requests = IntCounterVec::new(
            Opts::new("potd_requests_total", "Picture of the day requests by type"),
            &["type"],
        )?;

        registry.register(Box::new(scraper_execution.clone()))?;
        registry.register(Box::new(scraper_duration.clone()))?;
        registry.register(Box::new(scraper_last_success.clone()))?;
        registry.register(Box::new(scraper_triggered.clone()))?;
        registry.register(Box::new(image_download_size.clone()))?;
        registry.register(Box::new(requests.clone()))?;

        Ok(Self {
            registry,
            scraper_execution,
            scraper_duration,
            scraper_last_success,
            scraper_triggered,
            image_download_size,
            requests,
        })
    }

    /// Record a finished scrape.
    pub fn record_scrape(&self, result: &str, elapsed_secs: f64) {
        self.scraper_execution.with_label_values(&[result]).inc();
        self.scraper_duration
            .with_label_values(&[result])
            .observe(elapsed_secs);
    }

    /// Count an API request of the given type.
    pub fn record_request(&self, kind: &str) {
        self.requests.with_label_values(&[kind]).inc();
    }

    /// Render all metrics in the Prometheus text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}
