use tracing::debug;

use crate::error::AppResult;

use super::prober::run_probe;
use super::{
    ProbePlan, ProbeResult, Prober, SearchObserver, SweepSettings, pause_between_probes,
};

#[derive(Debug, Clone)]
pub struct SweepOutcome {
    pub results: Vec<ProbeResult>,
    /// Highest concurrency with at least one passing combination.
    pub best: Option<u64>,
}

/// Probes every (concurrency, rate) combination in order.
///
/// # Errors
///
/// Returns an error when the settings are invalid or a probe cannot be run.
pub async fn matrix_sweep<P, O>(
    prober: &P,
    settings: &SweepSettings,
    observer: &mut O,
) -> AppResult<SweepOutcome>
where
    P: Prober + ?Sized,
    O: SearchObserver + ?Sized,
{
    settings.validate()?;
    let mut results: Vec<ProbeResult> = Vec::new();
    for (concurrency, rate) in settings.combinations() {
        if !results.is_empty() {
            pause_between_probes(settings.pause).await;
        }
        let plan = ProbePlan {
            concurrency,
            request_count: settings.requests_per_probe,
            rate_limit: Some(rate),
        };
        observer.on_probe_start(plan);
        let result = run_probe(prober, plan, settings.threshold).await?;
        debug!(
            "Concurrency {} at rate {}: {:.1}% success",
            concurrency, rate, result.summary.success_rate
        );
        observer.on_probe_complete(&result);
        results.push(result);
    }

    let best = results
        .iter()
        .filter(|result| result.passed)
        .map(|result| result.concurrency)
        .max();
    Ok(SweepOutcome { results, best })
}
