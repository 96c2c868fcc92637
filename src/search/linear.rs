use tracing::{debug, info, warn};

use crate::args::SearchMethod;
use crate::error::AppResult;

use super::monotonic::find_violation;
use super::prober::run_probe;
use super::{
    ProbePlan, Prober, SearchObserver, SearchOutcome, SearchSettings, pause_between_probes,
};

/// Probes `start, start + step, ...` up to `max` in order.
///
/// With `stop_on_failure` the sweep ends at the first failing level and
/// never probes above it.
///
/// # Errors
///
/// Returns an error when the settings are invalid or a probe cannot be run.
pub async fn linear_search<P, O>(
    prober: &P,
    settings: &SearchSettings,
    observer: &mut O,
) -> AppResult<SearchOutcome>
where
    P: Prober + ?Sized,
    O: SearchObserver + ?Sized,
{
    settings.validate()?;
    let mut history = Vec::new();
    let mut anomalies = Vec::new();
    let mut best: Option<u64> = None;
    let mut halted_at = None;
    let mut concurrency = settings.start;

    while concurrency <= settings.max {
        if !history.is_empty() {
            pause_between_probes(settings.pause).await;
        }
        let plan = ProbePlan {
            concurrency,
            request_count: settings.requests_per_probe,
            rate_limit: settings.rate_limit,
        };
        observer.on_probe_start(plan);
        let result = run_probe(prober, plan, settings.threshold).await?;
        if let Some(violation) = find_violation(&history, &result) {
            warn!(
                "Success rate is not monotonic: passed at concurrency {} but failed at {}",
                violation.passed_at, violation.failed_at
            );
            anomalies.push(violation);
        }
        observer.on_probe_complete(&result);
        let passed = result.passed;
        history.push(result);

        if passed {
            best = Some(concurrency);
            debug!("Concurrency {} passed", concurrency);
        } else if settings.stop_on_failure {
            info!("Stopping at first failure (concurrency {})", concurrency);
            halted_at = Some(concurrency);
            break;
        }

        let Some(next) = concurrency.checked_add(settings.step) else {
            break;
        };
        concurrency = next;
    }

    Ok(SearchOutcome {
        method: SearchMethod::Linear,
        best,
        history,
        verification: None,
        halted_at,
        anomalies,
    })
}
