use std::collections::BTreeMap;
use std::time::Duration;

/// Status code recorded when no HTTP response was received.
pub const TRANSPORT_FAILURE_STATUS: u16 = 0;

#[must_use]
pub const fn is_success_status(status_code: u16) -> bool {
    status_code >= 200 && status_code < 300
}

/// Result of a single request attempt.
///
/// `status_code` is `0` when the request failed before a response arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOutcome {
    pub status_code: u16,
    pub elapsed: Duration,
    pub succeeded: bool,
    pub error_message: Option<String>,
}

impl RequestOutcome {
    /// Outcome for a received HTTP response. `error_message` is dropped for
    /// 2xx statuses.
    #[must_use]
    pub fn from_status(status_code: u16, elapsed: Duration, error_message: Option<String>) -> Self {
        let succeeded = is_success_status(status_code);
        Self {
            status_code,
            elapsed,
            succeeded,
            error_message: if succeeded { None } else { error_message },
        }
    }

    #[must_use]
    pub const fn transport_failure(elapsed: Duration, message: String) -> Self {
        Self {
            status_code: TRANSPORT_FAILURE_STATUS,
            elapsed,
            succeeded: false,
            error_message: Some(message),
        }
    }

    #[must_use]
    pub const fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Latency figures in seconds, computed over successful requests only.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LatencyStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub p95: f64,
    pub p99: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
    /// Percentage in `0.0..=100.0`.
    pub success_rate: f64,
    pub latency: LatencyStats,
    /// Requests per second over the batch wall time.
    pub throughput: f64,
    pub duration: Duration,
    pub status_codes: BTreeMap<u16, u64>,
    pub errors: BTreeMap<String, u64>,
}

impl BatchSummary {
    #[must_use]
    pub fn failure_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        100.0 - self.success_rate
    }

    #[must_use]
    pub fn meets_threshold(&self, threshold: f64) -> bool {
        self.success_rate >= threshold
    }

    /// Error messages ordered by descending count, ties broken by message.
    #[must_use]
    pub fn errors_by_frequency(&self) -> Vec<(&str, u64)> {
        let mut errors: Vec<(&str, u64)> = self
            .errors
            .iter()
            .map(|(message, count)| (message.as_str(), *count))
            .collect();
        errors.sort_by(|left, right| right.1.cmp(&left.1).then_with(|| left.0.cmp(right.0)));
        errors
    }
}
