//! Prometheus metrics for the CLA backend
//!
//! Recording goes through the `metrics` facade; the exporter handle is kept so
//! the HTTP layer can render the scrape output.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::fmt;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Every metric name the service emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    HttpRequests,
    HttpRequestDuration,
    MetricsSectionFailures,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::HttpRequests => "cla_http_requests_total",
            MetricName::HttpRequestDuration => "cla_http_request_duration_seconds",
            MetricName::MetricsSectionFailures => "cla_metrics_section_failures_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Install the Prometheus recorder. Safe to call more than once; later calls
/// reuse the first handle.
pub fn init() -> Result<(), String> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))?;
    // A concurrent init may have won; its handle is equivalent
    let _ = METRICS_HANDLE.set(handle);
    info!("Metrics system initialized");
    Ok(())
}

/// Current scrape output, or `None` before `init`
pub fn render() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

pub mod http {
    use super::MetricName;
    use metrics::Label;
    use std::time::Duration;

    pub fn record_request(method: &str, route: &str, status: u16, elapsed: Duration) {
        let labels = vec![
            Label::new("method", method.to_string()),
            Label::new("route", route.to_string()),
            Label::new("status", status.to_string()),
        ];
        metrics::counter!(MetricName::HttpRequests.as_str(), labels.clone()).increment(1);
        metrics::histogram!(MetricName::HttpRequestDuration.as_str(), labels)
            .record(elapsed.as_secs_f64());
    }
}

pub mod aggregation {
    use super::MetricName;

    pub fn section_failed(section: &'static str) {
        metrics::counter!(MetricName::MetricsSectionFailures.as_str(), "section" => section)
            .increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        assert_eq!(MetricName::HttpRequests.to_string(), "cla_http_requests_total");
        assert_eq!(
            MetricName::MetricsSectionFailures.as_str(),
            "cla_metrics_section_failures_total"
        );
    }
}
