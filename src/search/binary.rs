use tracing::{debug, warn};

use crate::args::SearchMethod;
use crate::error::AppResult;

use super::monotonic::find_violation;
use super::prober::run_probe;
use super::{
    ProbePlan, ProbeResult, Prober, SearchObserver, SearchOutcome, SearchSettings,
    pause_between_probes,
};

/// Bounds and best-so-far of a binary search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    pub low: u64,
    pub high: u64,
    /// Never decreases: accepted midpoints only move upward.
    pub best: u64,
    pub accepted_any: bool,
    pub history: Vec<ProbeResult>,
}

impl SearchState {
    #[must_use]
    pub const fn new(start: u64, max: u64) -> Self {
        Self {
            low: start,
            high: max,
            best: start,
            accepted_any: false,
            history: Vec::new(),
        }
    }

    /// Midpoint `floor((low + high) / 2)`, or `None` once `low > high`.
    #[must_use]
    pub const fn next_probe(&self) -> Option<u64> {
        if self.low > self.high {
            return None;
        }
        Some(
            self.low
                .saturating_add(self.high.saturating_sub(self.low).saturating_div(2)),
        )
    }

    /// Applies one probe: a pass moves `low` above it, a failure moves
    /// `high` below it.
    pub fn record(&mut self, result: ProbeResult) {
        let mid = result.concurrency;
        if result.passed {
            self.best = mid;
            self.accepted_any = true;
            match mid.checked_add(1) {
                Some(next) => self.low = next,
                // Nothing lies above u64::MAX.
                None => self.high = mid.saturating_sub(1),
            }
        } else {
            match mid.checked_sub(1) {
                Some(previous) => self.high = previous,
                None => self.low = 1,
            }
        }
        self.history.push(result);
    }
}

/// Binary search for the highest concurrency meeting `settings.threshold`.
///
/// Assumes the success rate does not increase with concurrency; observations
/// contradicting that are reported in [`SearchOutcome::anomalies`].
///
/// # Errors
///
/// Returns an error when the settings are invalid or a probe cannot be run.
pub async fn binary_search<P, O>(
    prober: &P,
    settings: &SearchSettings,
    observer: &mut O,
) -> AppResult<SearchOutcome>
where
    P: Prober + ?Sized,
    O: SearchObserver + ?Sized,
{
    settings.validate()?;
    let mut state = SearchState::new(settings.start, settings.max);
    let mut anomalies = Vec::new();

    while let Some(mid) = state.next_probe() {
        if !state.history.is_empty() {
            pause_between_probes(settings.pause).await;
        }
        let plan = ProbePlan {
            concurrency: mid,
            request_count: settings.requests_per_probe,
            rate_limit: settings.rate_limit,
        };
        observer.on_probe_start(plan);
        let result = run_probe(prober, plan, settings.threshold).await?;
        observer.on_probe_complete(&result);
        debug!(
            "Concurrency {}: {:.1}% success, {}",
            mid,
            result.summary.success_rate,
            if result.passed { "accepted" } else { "rejected" }
        );
        state.record(result);
        debug!("Search bounds now [{}, {}], best {}", state.low, state.high, state.best);
    }

    let verification = if settings.verify {
        pause_between_probes(settings.pause).await;
        let plan = ProbePlan {
            concurrency: state.best,
            request_count: settings.verification_requests(),
            rate_limit: settings.rate_limit,
        };
        observer.on_verification_start(plan);
        let result = run_probe(prober, plan, settings.threshold).await?;
        // Bounds only move away from earlier verdicts, so the verification
        // probe is the one place a contradiction can surface.
        if let Some(violation) = find_violation(&state.history, &result) {
            warn!(
                "Success rate is not monotonic: passed at concurrency {} but failed at {}",
                violation.passed_at, violation.failed_at
            );
            anomalies.push(violation);
        }
        observer.on_verification_complete(&result);
        Some(result)
    } else {
        None
    };

    Ok(SearchOutcome {
        method: SearchMethod::Binary,
        best: state.accepted_any.then_some(state.best),
        history: state.history,
        verification,
        halted_at: None,
        anomalies,
    })
}
