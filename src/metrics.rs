//! Prometheus exposition for the dashboard: a dataset-size gauge plus
//! descriptions for the counters emitted by the api and export modules.

use axum::{routing::get, Router};
use metrics::{describe_counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder, set the dataset-size gauge, and
    /// register descriptions for the counters incremented elsewhere.
    pub fn init(record_count: usize) -> Self {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .expect("prometheus: install recorder");

        // The table is static for the process lifetime, so this is set once.
        gauge!("dashboard_dataset_records").set(record_count as f64);

        describe_counter!(
            "dashboard_filter_requests_total",
            "Filtered-view computations served by the API"
        );
        describe_counter!(
            "dashboard_export_cache_hits_total",
            "CSV downloads answered from the content-hash cache"
        );
        describe_counter!(
            "dashboard_export_cache_misses_total",
            "CSV downloads that required serialization"
        );

        Self { handle }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
