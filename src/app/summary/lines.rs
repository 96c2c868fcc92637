use chrono::{DateTime, Local};

use concprobe::args::SearchMethod;
use concprobe::metrics::BatchSummary;
use concprobe::search::{
    MonotonicityViolation, ProbePlan, ProbeResult, SearchOutcome, SearchSettings, SweepOutcome,
    SweepSettings,
};

/// Width of the `=` rules framing each report block.
const RULE_WIDTH: usize = 80;
/// Width of the label column in the comparison table.
const TEST_COLUMN_WIDTH: usize = 40;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// `Concurrency=5, RPS=unlimited`; a missing or zero rate is unlimited.
pub(crate) fn combination_label(concurrency: u64, rate_limit: Option<f64>) -> String {
    match rate_limit.filter(|rate| *rate > 0.0) {
        Some(rate) => format!("Concurrency={}, RPS={}", concurrency, rate),
        None => format!("Concurrency={}, RPS=unlimited", concurrency),
    }
}

pub(crate) fn plan_label(plan: &ProbePlan) -> String {
    combination_label(plan.concurrency, plan.rate_limit)
}

pub(crate) fn search_header_lines(
    started: DateTime<Local>,
    endpoint: &str,
    method: SearchMethod,
    settings: &SearchSettings,
) -> Vec<String> {
    let mut lines = vec![
        rule(),
        format!("Maximum Concurrency Search ({})", method),
        format!("Started at: {}", started.format(TIMESTAMP_FORMAT)),
        format!("Endpoint: {}", endpoint),
        format!("Requests per test: {}", settings.requests_per_probe),
        format!("Success threshold: {}%", settings.threshold),
    ];
    match method {
        SearchMethod::Binary => lines.push(format!(
            "Testing from {} to {} concurrency",
            settings.start, settings.max
        )),
        SearchMethod::Linear => lines.push(format!(
            "Testing from {} to {} concurrency (step: {})",
            settings.start, settings.max, settings.step
        )),
    }
    if let Some(rate) = settings.rate_limit {
        lines.push(format!("Rate limit: {} requests/second", rate));
    }
    lines.push(rule());
    lines
}

pub(crate) fn sweep_header_lines(
    started: DateTime<Local>,
    endpoint: &str,
    timeout_secs: f64,
    settings: &SweepSettings,
) -> Vec<String> {
    vec![
        rule(),
        "API Performance Sweep".to_owned(),
        format!("Started at: {}", started.format(TIMESTAMP_FORMAT)),
        format!("Endpoint: {}", endpoint),
        format!("Total Requests: {}", settings.requests_per_probe),
        format!("Timeout: {}s", timeout_secs),
        rule(),
    ]
}

/// Full per-batch report: counts, latency block, throughput and histograms.
pub(crate) fn batch_report_lines(title: &str, summary: &BatchSummary) -> Vec<String> {
    let latency = &summary.latency;
    let mut lines = vec![
        String::new(),
        rule(),
        format!("Test: {}", title),
        rule(),
        format!("Total Requests:     {}", summary.total),
        format!(
            "Successful:         {} ({:.1}%)",
            summary.successful, summary.success_rate
        ),
        format!(
            "Failed:             {} ({:.1}%)",
            summary.failed,
            summary.failure_rate()
        ),
        String::new(),
        "Response Times (seconds):".to_owned(),
        format!("  Average:           {:.3}", latency.mean),
        format!("  Median:            {:.3}", latency.median),
        format!("  Min:               {:.3}", latency.min),
        format!("  Max:               {:.3}", latency.max),
        format!("  P95:               {:.3}", latency.p95),
        format!("  P99:               {:.3}", latency.p99),
        String::new(),
        "Throughput:".to_owned(),
        format!("  Requests/Second:   {:.2}", summary.throughput),
        format!("  Duration:          {:.2}s", summary.duration.as_secs_f64()),
    ];
    lines.extend(histogram_lines(summary));
    lines.push(rule());
    lines
}

/// Condensed report used between search probes.
pub(crate) fn probe_report_lines(result: &ProbeResult) -> Vec<String> {
    let summary = &result.summary;
    let mut lines = vec![
        String::new(),
        rule(),
        format!("Concurrency Level: {}", result.concurrency),
        rule(),
        format!("Total Requests:     {}", summary.total),
        format!(
            "Successful:         {} ({:.1}%)",
            summary.successful, summary.success_rate
        ),
        format!(
            "Failed:             {} ({:.1}%)",
            summary.failed,
            summary.failure_rate()
        ),
        format!("Avg Response Time:  {:.3}s", summary.latency.mean),
        format!("Duration:           {:.2}s", summary.duration.as_secs_f64()),
        format!("Requests/Second:    {:.2}", summary.throughput),
    ];
    lines.extend(histogram_lines(summary));
    lines.push(rule());
    lines
}

fn histogram_lines(summary: &BatchSummary) -> Vec<String> {
    let mut lines = Vec::new();
    if !summary.status_codes.is_empty() {
        lines.push(String::new());
        lines.push("Status Codes:".to_owned());
        for (code, count) in &summary.status_codes {
            lines.push(format!("  {}: {}", code, count));
        }
    }
    let errors = summary.errors_by_frequency();
    if !errors.is_empty() {
        lines.push(String::new());
        lines.push("Error Details:".to_owned());
        for (message, count) in errors {
            lines.push(format!("  {}: {}", message, count));
        }
    }
    lines
}

pub(crate) fn verdict_line(result: &ProbeResult) -> String {
    if result.passed {
        format!(
            "✓ Concurrency {}: {:.1}% success - ACCEPTABLE",
            result.concurrency, result.summary.success_rate
        )
    } else {
        format!(
            "✗ Concurrency {}: {:.1}% success - FAILED",
            result.concurrency, result.summary.success_rate
        )
    }
}

pub(crate) fn verification_header_lines(plan: &ProbePlan) -> Vec<String> {
    vec![
        String::new(),
        rule(),
        "FINAL VERIFICATION TEST".to_owned(),
        rule(),
        format!("Testing best concurrency level: {}", plan.concurrency),
        format!("Requests: {}", plan.request_count),
    ]
}

pub(crate) fn search_summary_lines(outcome: &SearchOutcome, threshold: f64) -> Vec<String> {
    let mut lines = vec![String::new(), rule(), "SUMMARY".to_owned(), rule()];
    match outcome.best {
        Some(best) => {
            lines.push(format!(
                "Maximum Concurrency (>={}% success): {}",
                threshold, best
            ));
            if let Some(last) = outcome.history.iter().rev().find(|result| result.passed) {
                lines.push(format!(
                    "Last successful test had {:.1}% success rate",
                    last.summary.success_rate
                ));
            }
        }
        None => lines.push(format!(
            "No concurrency level met the {}% success threshold",
            threshold
        )),
    }
    if let Some(halted_at) = outcome.halted_at {
        lines.push(format!("Stopped at first failure (concurrency {})", halted_at));
    }
    lines.push(format!("Probes run: {}", outcome.history.len()));

    if let Some(verification) = outcome.verification.as_ref() {
        let summary = &verification.summary;
        lines.push(format!(
            "Final Test Results (concurrency {}):",
            verification.concurrency
        ));
        lines.push(format!("  - Success Rate: {:.1}%", summary.success_rate));
        lines.push(format!(
            "  - Successful Requests: {}/{}",
            summary.successful, summary.total
        ));
        lines.push(format!(
            "  - Average Response Time: {:.3}s",
            summary.latency.mean
        ));
        lines.push(format!(
            "  - Throughput: {:.2} requests/second",
            summary.throughput
        ));
        if !verification.passed {
            lines.push("  - Verification fell below the threshold".to_owned());
        }
    }

    lines.extend(anomaly_lines(&outcome.anomalies));
    lines.push(rule());
    lines
}

pub(crate) fn anomaly_lines(anomalies: &[MonotonicityViolation]) -> Vec<String> {
    if anomalies.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![format!(
        "Warning: success rate was not monotonic in concurrency ({} observation(s)); the reported maximum may not be optimal.",
        anomalies.len()
    )];
    for violation in anomalies {
        if violation.passed_at == violation.failed_at {
            lines.push(format!(
                "  - concurrency {} both passed and failed",
                violation.passed_at
            ));
        } else {
            lines.push(format!(
                "  - passed at {} after failing at {}",
                violation.passed_at, violation.failed_at
            ));
        }
    }
    lines
}

pub(crate) fn comparison_lines(outcome: &SweepOutcome) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        rule(),
        "COMPARISON SUMMARY".to_owned(),
        rule(),
        format!(
            "{:<width$} {:<12} {:<12} {:<12} {}",
            "Test",
            "Success %",
            "Avg RT (s)",
            "RPS",
            "Result",
            width = TEST_COLUMN_WIDTH
        ),
        "-".repeat(RULE_WIDTH),
    ];
    for result in &outcome.results {
        let summary = &result.summary;
        lines.push(format!(
            "{:<width$} {:>10.1}%  {:>10.3}  {:>10.2}  {}",
            combination_label(result.concurrency, result.rate_limit),
            summary.success_rate,
            summary.latency.mean,
            summary.throughput,
            if result.passed { "PASS" } else { "FAIL" },
            width = TEST_COLUMN_WIDTH
        ));
    }
    lines.push(String::new());
    match outcome.best {
        Some(best) => lines.push(format!("Highest passing concurrency: {}", best)),
        None => lines.push("No combination met the success threshold".to_owned()),
    }
    lines.push(rule());
    lines
}
