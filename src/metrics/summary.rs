use std::collections::BTreeMap;
use std::time::Duration;

use super::types::{BatchSummary, LatencyStats, RequestOutcome};

const P95: u64 = 95;
const P99: u64 = 99;

/// Reduces raw outcomes of one batch into a [`BatchSummary`].
///
/// Pure: the same outcomes and wall time always give the same summary.
#[must_use]
pub fn reduce(outcomes: &[RequestOutcome], elapsed_wall_time: Duration) -> BatchSummary {
    let total = u64::try_from(outcomes.len()).unwrap_or(u64::MAX);
    let successful = u64::try_from(outcomes.iter().filter(|outcome| outcome.succeeded).count())
        .unwrap_or(u64::MAX);
    let failed = total.saturating_sub(successful);

    let success_rate = if total > 0 {
        successful as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    let mut latencies: Vec<f64> = outcomes
        .iter()
        .filter(|outcome| outcome.succeeded)
        .map(RequestOutcome::elapsed_secs)
        .collect();
    latencies.sort_by(f64::total_cmp);
    let latency = latency_stats(&latencies);

    let wall_secs = elapsed_wall_time.as_secs_f64();
    let throughput = if wall_secs > 0.0 {
        total as f64 / wall_secs
    } else {
        0.0
    };

    let mut status_codes: BTreeMap<u16, u64> = BTreeMap::new();
    let mut errors: BTreeMap<String, u64> = BTreeMap::new();
    for outcome in outcomes {
        let count = status_codes.entry(outcome.status_code).or_insert(0);
        *count = count.saturating_add(1);
        if let Some(message) = outcome.error_message.as_ref()
            && !message.is_empty()
        {
            let count = errors.entry(message.clone()).or_insert(0);
            *count = count.saturating_add(1);
        }
    }

    BatchSummary {
        total,
        successful,
        failed,
        success_rate,
        latency,
        throughput,
        duration: elapsed_wall_time,
        status_codes,
        errors,
    }
}

/// Expects `sorted` in ascending order.
fn latency_stats(sorted: &[f64]) -> LatencyStats {
    let (Some(min), Some(max)) = (sorted.first(), sorted.last()) else {
        return LatencyStats::default();
    };
    let sum: f64 = sorted.iter().sum();
    LatencyStats {
        mean: sum / sorted.len() as f64,
        min: *min,
        max: *max,
        median: median(sorted),
        p95: percentile(sorted, P95),
        p99: percentile(sorted, P99),
    }
}

fn median(sorted: &[f64]) -> f64 {
    let len = sorted.len();
    let mid = len / 2;
    if len % 2 == 1 {
        return sorted.get(mid).copied().unwrap_or(0.0);
    }
    match (sorted.get(mid.saturating_sub(1)), sorted.get(mid)) {
        (Some(lower), Some(upper)) => (lower + upper) / 2.0,
        _ => 0.0,
    }
}

/// Index `floor(percent / 100 * len)`, clamped to the last element.
fn percentile(sorted: &[f64], percent: u64) -> f64 {
    let len = u64::try_from(sorted.len()).unwrap_or(u64::MAX);
    let index = len
        .saturating_mul(percent)
        .checked_div(100)
        .unwrap_or(0)
        .min(len.saturating_sub(1));
    usize::try_from(index)
        .ok()
        .and_then(|idx| sorted.get(idx))
        .copied()
        .unwrap_or(0.0)
}
