//! # IAM Observe - Observability Layer
//!
//! Structured logging, operation spans and Prometheus metrics for the account service.

#![deny(unsafe_code)]

use std::sync::OnceLock;

use anyhow::Result;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Global Prometheus handle for rendering metrics
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub mod logging;
pub mod metrics;

pub use logging::{LogConfig, LogFormat, account_span, init_logging, record_outcome};

/// Install a compact subscriber filtered by `RUST_LOG`, default `info,iam=debug`
///
/// Leaves an already installed subscriber in place.
pub fn init_tracing() -> Result<()> {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info,iam=debug".to_string());

    if let Err(e) = init_logging(&LogConfig::new(LogFormat::Compact, filter)) {
        tracing::debug!(error = %e, "Subscriber not installed, keeping the existing one");
    }
    Ok(())
}

/// Install the Prometheus recorder and register metric descriptions
pub fn init_metrics() -> Result<()> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;

    let _ = PROMETHEUS_HANDLE.set(handle);

    metrics::init_metrics_descriptions();

    tracing::info!("Metrics recorder initialized");

    Ok(())
}

/// Render current metrics in Prometheus text format
///
/// Returns None if metrics haven't been initialized yet
pub fn render_metrics() -> Option<String> {
    PROMETHEUS_HANDLE.get().map(|handle| handle.render())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_twice() {
        assert!(init_tracing().is_ok());
        assert!(init_tracing().is_ok());
    }
}
