use std::sync::Arc;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::AppResult;
use crate::http::{BatchPlan, RequestExecutor, run_batch};
use crate::metrics::{BatchSummary, reduce};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbePlan {
    pub concurrency: u64,
    pub request_count: u64,
    pub rate_limit: Option<f64>,
}

/// Runs one batch at a given concurrency and summarizes it.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, plan: ProbePlan) -> AppResult<BatchSummary>;
}

/// [`Prober`] over the batch runner and summary reducer.
pub struct BatchProber<E> {
    executor: Arc<E>,
}

impl<E> BatchProber<E> {
    #[must_use]
    pub const fn new(executor: Arc<E>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl<E> Prober for BatchProber<E>
where
    E: RequestExecutor + 'static,
{
    async fn probe(&self, plan: ProbePlan) -> AppResult<BatchSummary> {
        let concurrency_limit = usize::try_from(plan.concurrency).unwrap_or(usize::MAX);
        let batch = BatchPlan::new(plan.request_count, concurrency_limit, plan.rate_limit)?;
        let started = Instant::now();
        let outcomes = run_batch(Arc::clone(&self.executor), &batch).await;
        Ok(reduce(&outcomes, started.elapsed()))
    }
}

/// One probe's summary with the verdict against the success threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub concurrency: u64,
    pub rate_limit: Option<f64>,
    pub summary: BatchSummary,
    pub passed: bool,
}

pub(super) async fn run_probe<P>(
    prober: &P,
    plan: ProbePlan,
    threshold: f64,
) -> AppResult<ProbeResult>
where
    P: Prober + ?Sized,
{
    let summary = prober.probe(plan).await?;
    let passed = summary.meets_threshold(threshold);
    Ok(ProbeResult {
        concurrency: plan.concurrency,
        rate_limit: plan.rate_limit.filter(|rate| *rate > 0.0),
        summary,
        passed,
    })
}
