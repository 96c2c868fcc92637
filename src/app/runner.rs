use std::time::Duration;

use chrono::Local;
use tracing::info;

use concprobe::args::SearchMethod;
use concprobe::error::AppResult;
use concprobe::search::{self, Prober, SearchOutcome, SearchSettings, SweepOutcome, SweepSettings};

use super::progress::{ConsoleObserver, ReportStyle};
use super::summary::{
    comparison_lines, print_lines, search_header_lines, search_summary_lines, sweep_header_lines,
};

/// Runs a concurrency search and prints its report.
///
/// # Errors
///
/// Returns an error when a probe cannot be run.
pub(crate) async fn run_search<P>(
    prober: &P,
    method: SearchMethod,
    settings: &SearchSettings,
    endpoint: &str,
    verbose: bool,
) -> AppResult<SearchOutcome>
where
    P: Prober + ?Sized,
{
    print_lines(&search_header_lines(Local::now(), endpoint, method, settings));
    let mut observer = ConsoleObserver::new(ReportStyle::Search, verbose);
    let outcome = search::run_search(method, prober, settings, &mut observer).await?;
    match outcome.best {
        Some(best) => info!("Search finished: maximum concurrency {}", best),
        None => info!("Search finished: no concurrency met the threshold"),
    }
    print_lines(&search_summary_lines(&outcome, settings.threshold));
    Ok(outcome)
}

/// Runs a fixed-combination sweep and prints per-probe reports plus the
/// comparison table.
///
/// # Errors
///
/// Returns an error when a probe cannot be run.
pub(crate) async fn run_sweep<P>(
    prober: &P,
    settings: &SweepSettings,
    endpoint: &str,
    timeout: Duration,
) -> AppResult<SweepOutcome>
where
    P: Prober + ?Sized,
{
    print_lines(&sweep_header_lines(
        Local::now(),
        endpoint,
        timeout.as_secs_f64(),
        settings,
    ));
    let mut observer = ConsoleObserver::new(ReportStyle::Sweep, true);
    let outcome = search::matrix_sweep(prober, settings, &mut observer).await?;
    if outcome.results.len() > 1 {
        print_lines(&comparison_lines(&outcome));
    }
    Ok(outcome)
}
