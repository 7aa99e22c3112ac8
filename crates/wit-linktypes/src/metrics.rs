//! Controller Metrics
//!
//! Metrics tracked:
//! - `wit_link_type_requests_total` - counter of handled actions
//! - `wit_link_type_not_modified_total` - counter of 304 answers
//! - `wit_link_type_errors_total` - counter of failed actions by status

use metrics::{counter, describe_counter};

/// Register descriptions for all metrics
pub fn describe_metrics() {
    describe_counter!(
        "wit_link_type_requests_total",
        "Total number of work item link type actions handled"
    );
    describe_counter!(
        "wit_link_type_not_modified_total",
        "Total number of conditional requests answered with 304"
    );
    describe_counter!(
        "wit_link_type_errors_total",
        "Total number of work item link type actions that failed"
    );
}

pub fn record_request(action: &'static str) {
    counter!("wit_link_type_requests_total", "action" => action).increment(1);
}

pub fn record_not_modified(action: &'static str) {
    counter!("wit_link_type_not_modified_total", "action" => action).increment(1);
}

pub fn record_error(action: &'static str, status: http::StatusCode) {
    counter!(
        "wit_link_type_errors_total",
        "action" => action,
        "status" => status.as_str().to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_util::debugging::{DebugValue, DebuggingRecorder};
    use metrics_util::MetricKind;

    /// (name, labels, value) of every counter emitted by `f`
    fn counters(f: impl FnOnce()) -> Vec<(String, Vec<(String, String)>, u64)> {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();
        metrics::with_local_recorder(&recorder, f);

        let mut counters: Vec<_> = snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .filter(|(key, ..)| key.kind() == MetricKind::Counter)
            .map(|(key, _, _, value)| {
                let (_, key) = key.into_parts();
                let labels = key
                    .labels()
                    .map(|label| (label.key().to_string(), label.value().to_string()))
                    .collect();
                let value = match value {
                    DebugValue::Counter(value) => value,
                    _ => 0,
                };
                (key.name().to_string(), labels, value)
            })
            .collect();
        counters.sort();
        counters
    }

    fn labels(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_request_counter_by_action() {
        let emitted = counters(|| {
            record_request("show");
            record_request("show");
            record_request("list");
        });
        assert_eq!(
            emitted,
            vec![
                (
                    "wit_link_type_requests_total".to_string(),
                    labels(&[("action", "list")]),
                    1
                ),
                (
                    "wit_link_type_requests_total".to_string(),
                    labels(&[("action", "show")]),
                    2
                ),
            ]
        );
    }

    #[test]
    fn test_not_modified_and_error_counters() {
        let emitted = counters(|| {
            describe_metrics();
            record_not_modified("list");
            record_error("create", http::StatusCode::CONFLICT);
        });
        assert_eq!(
            emitted,
            vec![
                (
                    "wit_link_type_errors_total".to_string(),
                    labels(&[("action", "create"), ("status", "409")]),
                    1
                ),
                (
                    "wit_link_type_not_modified_total".to_string(),
                    labels(&[("action", "list")]),
                    1
                ),
            ]
        );
    }
}
