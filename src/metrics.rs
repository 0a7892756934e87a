//! Metric emission seam.
//!
//! Fire-and-forget: a failing metric pipeline must never affect a session,
//! so `emit` is infallible from the caller's point of view.

use crate::defaults;
use std::sync::Mutex;

/// Unit attached to a metric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricUnit {
    Seconds,
    Count,
}

impl MetricUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricUnit::Seconds => "Seconds",
            MetricUnit::Count => "Count",
        }
    }
}

/// Trait for metric emission.
///
/// This trait allows swapping implementations (log-backed vs recording
/// mock).
pub trait MetricSink: Send + Sync {
    fn emit(&self, name: &str, value: f64, unit: MetricUnit);
}

/// Metric sink that logs structured metric records.
pub struct LogMetricSink;

impl MetricSink for LogMetricSink {
    fn emit(&self, name: &str, value: f64, unit: MetricUnit) {
        tracing::info!(
            namespace = defaults::METRIC_NAMESPACE,
            metric = name,
            value,
            unit = unit.as_str(),
            "metric"
        );
    }
}

/// Metric sink that records emissions for assertions in tests.
#[derive(Default)]
pub struct RecordingMetricSink {
    records: Mutex<Vec<(String, f64, MetricUnit)>>,
}

impl RecordingMetricSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<(String, f64, MetricUnit)> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Names of emitted metrics, in emission order.
    pub fn names(&self) -> Vec<String> {
        self.records()
            .into_iter()
            .map(|(name, _, _)| name)
            .collect()
    }
}

impl MetricSink for RecordingMetricSink {
    fn emit(&self, name: &str, value: f64, unit: MetricUnit) {
        if let Ok(mut records) = self.records.lock() {
            records.push((name.to_string(), value, unit));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_strings() {
        assert_eq!(MetricUnit::Seconds.as_str(), "Seconds");
        assert_eq!(MetricUnit::Count.as_str(), "Count");
    }

    #[test]
    fn test_recording_sink_captures_emissions_in_order() {
        let sink = RecordingMetricSink::new();
        sink.emit("DownloadTime", 0.25, MetricUnit::Seconds);
        sink.emit("SessionDuration", 12.5, MetricUnit::Seconds);

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].0, "DownloadTime");
        assert_eq!(records[1], ("SessionDuration".to_string(), 12.5, MetricUnit::Seconds));
        assert_eq!(sink.names(), vec!["DownloadTime", "SessionDuration"]);
    }

    #[test]
    fn test_log_sink_does_not_panic() {
        LogMetricSink.emit("DownloadTime", 1.0, MetricUnit::Seconds);
    }
}
