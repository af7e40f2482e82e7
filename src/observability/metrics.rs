use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;


// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the process-wide `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}

/// Flag the process as alive; both the scheduled service and `--run-once` call it.
pub async fn mark_up() {
    get_metrics().await.up.set(1);
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Report runs
    pub report_runs: IntCounterVec,
    pub report_failures: IntCounterVec,
    pub report_duration: HistogramVec,

    // Token cache
    pub token_exchanges: IntCounter,
    pub token_cache_hits: IntCounter,

    // Config/runtime
    pub config_parse_failures: IntCounter,
    pub config_validation_errors: IntCounter,
    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("feedbackdigest".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Report runs
            report_runs: IntCounterVec::new(Opts::new("report_runs_total", "Weekly report runs by outcome"),&["outcome"],).unwrap(),
            report_failures: IntCounterVec::new(Opts::new("report_failures_total", "Failed runs by boundary and error kind"),&["boundary", "kind"],).unwrap(),
            report_duration: HistogramVec::new(HistogramOpts::new("report_run_duration_seconds", "Report run duration seconds").buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),&["outcome"],).unwrap(),

            // Token cache
            token_exchanges: IntCounter::new("token_exchanges_total", "Assertion-for-token exchanges attempted").unwrap(),
            token_cache_hits: IntCounter::new("token_cache_hits_total", "Valid cached token served").unwrap(),

            // Config/runtime
            config_parse_failures: IntCounter::new("config_parse_failures_total", "Config files that failed to parse").unwrap(),
            config_validation_errors: IntCounter::new("config_validation_errors_total","Validation errors during startup",).unwrap(),
            up: IntGauge::new("up", "1 if service is healthy").unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.report_runs.clone())).unwrap();
        reg.register(Box::new(metrics.report_failures.clone())).unwrap();
        reg.register(Box::new(metrics.report_duration.clone())).unwrap();
        reg.register(Box::new(metrics.token_exchanges.clone())).unwrap();
        reg.register(Box::new(metrics.token_cache_hits.clone())).unwrap();
        reg.register(Box::new(metrics.config_parse_failures.clone())).unwrap();
        reg.register(Box::new(metrics.config_validation_errors.clone())).unwrap();
        reg.register(Box::new(metrics.up.clone())).unwrap();

        metrics
    }
}
