use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{Instant, sleep};

use super::executor::extract_error_detail;
use super::target::join_endpoint;
use super::*;
use crate::metrics::{RequestOutcome, reduce};

fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

/// Sleeps for a fixed latency and records how many calls overlap.
struct InstrumentedExecutor {
    latency: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
    dispatches: Mutex<Vec<Instant>>,
}

impl InstrumentedExecutor {
    fn new(latency: Duration) -> Self {
        Self {
            latency,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
            dispatches: Mutex::new(Vec::new()),
        }
    }

    fn dispatch_times(&self) -> Result<Vec<Instant>, String> {
        self.dispatches
            .lock()
            .map(|times| times.clone())
            .map_err(|err| format!("dispatch log poisoned: {}", err))
    }
}

#[async_trait]
impl RequestExecutor for InstrumentedExecutor {
    async fn execute(&self) -> RequestOutcome {
        if let Ok(mut times) = self.dispatches.lock() {
            times.push(Instant::now());
        }
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        self.peak.fetch_max(current, Ordering::SeqCst);
        sleep(self.latency).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        // Every third request fails so failures flow through the batch too.
        if call % 3 == 2 {
            return RequestOutcome::from_status(503, self.latency, Some("busy".to_owned()));
        }
        RequestOutcome::from_status(200, self.latency, None)
    }
}

#[test]
fn batch_never_exceeds_concurrency_limit() -> Result<(), String> {
    run_async_test(async {
        let executor = Arc::new(InstrumentedExecutor::new(Duration::from_millis(10)));
        let plan = BatchPlan::new(60, 4, None).map_err(|err| err.to_string())?;
        let outcomes = run_batch(Arc::clone(&executor), &plan).await;

        let peak = executor.peak.load(Ordering::SeqCst);
        if peak > 4 {
            return Err(format!("Peak in-flight {} exceeded limit 4", peak));
        }
        if peak < 2 {
            return Err(format!("Expected overlapping requests, peak was {}", peak));
        }
        if outcomes.len() != 60 {
            return Err(format!("Expected 60 outcomes, got {}", outcomes.len()));
        }
        Ok(())
    })
}

#[test]
fn batch_keeps_every_outcome_including_failures() -> Result<(), String> {
    run_async_test(async {
        let executor = Arc::new(InstrumentedExecutor::new(Duration::from_millis(1)));
        let plan = BatchPlan::new(30, 8, None).map_err(|err| err.to_string())?;
        let outcomes = run_batch(executor, &plan).await;
        let summary = reduce(&outcomes, Duration::from_millis(100));
        if summary.total != 30 || summary.failed != 10 || summary.successful != 20 {
            return Err(format!("Unexpected counts: {:?}", summary));
        }
        if summary.errors.get("busy") != Some(&10) {
            return Err(format!("Unexpected errors: {:?}", summary.errors));
        }
        Ok(())
    })
}

#[test]
fn empty_batch_returns_no_outcomes() -> Result<(), String> {
    run_async_test(async {
        let executor = Arc::new(InstrumentedExecutor::new(Duration::from_millis(1)));
        let plan = BatchPlan::new(0, 1, None).map_err(|err| err.to_string())?;
        let outcomes = run_batch(Arc::clone(&executor), &plan).await;
        if !outcomes.is_empty() || executor.calls.load(Ordering::SeqCst) != 0 {
            return Err("Expected no requests for an empty batch".to_owned());
        }
        Ok(())
    })
}

#[test]
fn rate_limit_spaces_dispatches() -> Result<(), String> {
    run_async_test(async {
        let executor = Arc::new(InstrumentedExecutor::new(Duration::from_millis(1)));
        let rate = 50.0;
        let plan = BatchPlan::new(10, 10, Some(rate)).map_err(|err| err.to_string())?;
        let started = Instant::now();
        let outcomes = run_batch(Arc::clone(&executor), &plan).await;
        let wall = started.elapsed();
        if outcomes.len() != 10 {
            return Err(format!("Expected 10 outcomes, got {}", outcomes.len()));
        }

        let times = executor.dispatch_times()?;
        let (Some(first), Some(last)) = (times.iter().min(), times.iter().max()) else {
            return Err("No dispatches recorded".to_owned());
        };
        // Nine gaps of 20ms; allow a little timer slack.
        let span = last.saturating_duration_since(*first);
        if span < Duration::from_millis(170) {
            return Err(format!("Dispatches too dense: span {:?}", span));
        }
        let allowed = (rate * wall.as_secs_f64()).ceil() + 1.0;
        if times.len() as f64 > allowed {
            return Err(format!(
                "{} dispatches in {:?} exceeds rate bound {}",
                times.len(),
                wall,
                allowed
            ));
        }
        Ok(())
    })
}

#[test]
fn fixed_latency_batch_matches_expected_figures() -> Result<(), String> {
    run_async_test(async {
        struct FixedLatency;

        #[async_trait]
        impl RequestExecutor for FixedLatency {
            async fn execute(&self) -> RequestOutcome {
                sleep(Duration::from_millis(50)).await;
                RequestOutcome::from_status(200, Duration::from_millis(50), None)
            }
        }

        let plan = BatchPlan::new(100, 10, None).map_err(|err| err.to_string())?;
        let started = Instant::now();
        let outcomes = run_batch(Arc::new(FixedLatency), &plan).await;
        let summary = reduce(&outcomes, started.elapsed());

        if (summary.success_rate - 100.0).abs() > f64::EPSILON || summary.failed != 0 {
            return Err(format!("Unexpected success figures: {:?}", summary));
        }
        if (summary.latency.mean - 0.05).abs() > 1e-9 {
            return Err(format!("Unexpected mean latency: {}", summary.latency.mean));
        }
        // Ten waves of 50ms: at most 200 rps, well above 100 rps in practice.
        if summary.throughput > 201.0 || summary.throughput < 100.0 {
            return Err(format!("Unexpected throughput: {}", summary.throughput));
        }
        Ok(())
    })
}

#[test]
fn batch_plan_rejects_invalid_limits() -> Result<(), String> {
    if BatchPlan::new(10, 0, None).is_ok() {
        return Err("Expected zero concurrency to be rejected".to_owned());
    }
    if BatchPlan::new(10, 1, Some(-1.0)).is_ok() {
        return Err("Expected negative rate to be rejected".to_owned());
    }
    if BatchPlan::new(10, 1, Some(0.0)).is_err() {
        return Err("Zero rate means unlimited and must be accepted".to_owned());
    }
    Ok(())
}

#[test]
fn pacing_gate_treats_non_positive_rate_as_unlimited() -> Result<(), String> {
    if PacingGate::per_second(0.0).is_some() || PacingGate::per_second(f64::NAN).is_some() {
        return Err("Expected no gate for unlimited rates".to_owned());
    }
    let gate = PacingGate::per_second(4.0).ok_or_else(|| "Expected gate".to_owned())?;
    if gate.min_interval() != Duration::from_millis(250) {
        return Err(format!("Unexpected interval: {:?}", gate.min_interval()));
    }
    Ok(())
}

#[test]
fn error_detail_prefers_structured_fields() -> Result<(), String> {
    let cases = [
        (429, r#"{"detail": "Request was throttled."}"#, "Request was throttled."),
        (400, r#"{"message": "Bad query"}"#, "Bad query"),
        (400, r#"{"detail": {"q": "required"}}"#, r#"{"q":"required"}"#),
        (500, "", "HTTP 500"),
        (502, "   ", "HTTP 502"),
        (400, r#"{"error": "nope"}"#, r#"{"error": "nope"}"#),
    ];
    for (status, body, expected) in cases {
        let detail = extract_error_detail(status, body);
        if detail != expected {
            return Err(format!("status {}: expected '{}', got '{}'", status, expected, detail));
        }
    }
    Ok(())
}

#[test]
fn error_detail_truncates_json_without_known_fields() -> Result<(), String> {
    let body = format!(r#"{{"errors": ["{}"]}}"#, "x".repeat(500));
    let detail = extract_error_detail(500, &body);
    if detail.chars().count() != 100 || !detail.starts_with(r#"{"errors": ["xxx"#) {
        return Err(format!("Expected 100-char JSON excerpt, got '{}'", detail));
    }
    Ok(())
}

#[test]
fn error_detail_groups_non_json_bodies_by_status() -> Result<(), String> {
    let cases = [
        (502, "<html><body>Bad Gateway</body></html>"),
        (503, "Service Unavailable"),
        (500, "{ not json"),
    ];
    for (status, body) in cases {
        let detail = extract_error_detail(status, body);
        let expected = format!("HTTP {}", status);
        if detail != expected {
            return Err(format!("expected '{}', got '{}'", expected, detail));
        }
    }
    Ok(())
}

#[test]
fn endpoint_join_uses_single_separator() -> Result<(), String> {
    let cases = [
        ("https://api.example.com/v4", "search/", "https://api.example.com/v4/search/"),
        ("https://api.example.com/v4/", "/search/", "https://api.example.com/v4/search/"),
        ("https://api.example.com/v4", "", "https://api.example.com/v4/"),
    ];
    for (base, endpoint, expected) in cases {
        let joined = join_endpoint(base, endpoint);
        if joined != expected {
            return Err(format!("Expected {}, got {}", expected, joined));
        }
    }
    Ok(())
}

#[test]
fn target_rejects_invalid_url() -> Result<(), String> {
    if Target::from_parts("not a url", "search/", None).is_ok() {
        return Err("Expected invalid base URL to fail".to_owned());
    }
    let target = Target::from_parts(
        "http://127.0.0.1:8080/api",
        "items/?page=2",
        Some(Credential::new("Token", "secret")),
    )
    .map_err(|err| err.to_string())?;
    if target.url.as_str() != "http://127.0.0.1:8080/api/items/?page=2" {
        return Err(format!("Unexpected URL: {}", target.url));
    }
    if format!("{:?}", target).contains("secret") {
        return Err("Credential leaked into Debug output".to_owned());
    }
    Ok(())
}

#[test]
fn ip_literal_targets_skip_lookup() -> Result<(), String> {
    run_async_test(async {
        let target = Target::from_parts("http://127.0.0.1:9", "x", None)
            .map_err(|err| err.to_string())?;
        let resolved = target.pre_resolve().await.map_err(|err| err.to_string())?;
        if resolved.is_some() {
            return Err("IP literal should not be resolved".to_owned());
        }
        Ok(())
    })
}
