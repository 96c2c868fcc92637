//! Concurrency search: probes a target at chosen concurrency levels and
//! locates the highest level whose success rate meets a threshold.
mod binary;
mod linear;
mod monotonic;
mod observer;
mod prober;
mod settings;
mod sweep;


use std::time::Duration;

use tokio::time::sleep;

use crate::args::SearchMethod;
use crate::error::AppResult;

pub use binary::{SearchState, binary_search};
pub use linear::linear_search;
pub use monotonic::MonotonicityViolation;
pub use observer::{SearchObserver, SilentObserver};
pub use prober::{BatchProber, ProbePlan, ProbeResult, Prober};
pub use settings::{SearchSettings, SweepSettings};
pub use sweep::{SweepOutcome, matrix_sweep};

/// Result of a search run, whichever policy produced it.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub method: SearchMethod,
    /// Highest accepted concurrency; `None` when no probe met the threshold.
    pub best: Option<u64>,
    /// Every probe in the order it ran, excluding verification.
    pub history: Vec<ProbeResult>,
    pub verification: Option<ProbeResult>,
    /// Concurrency at which a linear sweep stopped on its first failure.
    pub halted_at: Option<u64>,
    pub anomalies: Vec<MonotonicityViolation>,
}

/// Runs the policy selected by `method`.
///
/// # Errors
///
/// Returns an error when the settings are invalid or a probe cannot be run.
pub async fn run_search<P, O>(
    method: SearchMethod,
    prober: &P,
    settings: &SearchSettings,
    observer: &mut O,
) -> AppResult<SearchOutcome>
where
    P: Prober + ?Sized,
    O: SearchObserver + ?Sized,
{
    match method {
        SearchMethod::Binary => binary_search(prober, settings, observer).await,
        SearchMethod::Linear => linear_search(prober, settings, observer).await,
    }
}

async fn pause_between_probes(pause: Duration) {
    if !pause.is_zero() {
        sleep(pause).await;
    }
}
