// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub const CHECKS_TOTAL: &str = "certwatch_checks_total";
pub const DISCREPANCIES_TOTAL: &str = "certwatch_discrepancies_total";
pub const CHECK_DURATION: &str = "certwatch_check_duration_seconds";

/// Initialize telemetry (logs + metrics)
pub fn init_telemetry() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "certwatch_node=info,certwatch_kernel=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if PROM_HANDLE.set(handle).is_err() {
                tracing::warn!("Prometheus handle already set. Telemetry re-initialized?");
            }
        }
        Err(e) => tracing::error!("Failed to install Prometheus recorder: {}", e),
    }

    metrics::describe_counter!(CHECKS_TOTAL, "Checks run, by outcome");
    metrics::describe_counter!(DISCREPANCIES_TOTAL, "Discrepancies found, by field");
    metrics::describe_histogram!(CHECK_DURATION, "Time taken by one fetch, verify and compare cycle");

    metrics::gauge!("certwatch_node_up", 1.0);
}

/// Get the Prometheus handle to render metrics
pub fn get_metrics() -> String {
    if let Some(handle) = PROM_HANDLE.get() {
        handle.render()
    } else {
        "# metrics not initialized".to_string()
    }
}
