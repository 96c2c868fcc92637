use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{debug, error};

use crate::error::{AppError, AppResult, ValidationError};
use crate::metrics::RequestOutcome;

use super::executor::RequestExecutor;
use super::pacing::PacingGate;

/// Parameters of one batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchPlan {
    pub request_count: u64,
    pub concurrency_limit: usize,
    /// Dispatches per second; `None` or `<= 0` means unlimited.
    pub rate_limit: Option<f64>,
}

impl BatchPlan {
    /// # Errors
    ///
    /// Returns an error when `concurrency_limit` is zero or `rate_limit` is
    /// negative or not finite.
    pub fn new(
        request_count: u64,
        concurrency_limit: usize,
        rate_limit: Option<f64>,
    ) -> AppResult<Self> {
        if concurrency_limit == 0 {
            return Err(AppError::validation(ValidationError::ConcurrencyZero));
        }
        if let Some(rate) = rate_limit
            && (!rate.is_finite() || rate < 0.0)
        {
            return Err(AppError::validation(ValidationError::NegativeRate {
                value: rate,
            }));
        }
        Ok(Self {
            request_count,
            concurrency_limit,
            rate_limit,
        })
    }
}

/// Runs `plan.request_count` executions with at most
/// `plan.concurrency_limit` in flight, returning once every one finished.
///
/// Outcomes come back in dispatch-index order; one outcome per request is
/// always returned, including for tasks that panicked.
pub async fn run_batch<E>(executor: Arc<E>, plan: &BatchPlan) -> Vec<RequestOutcome>
where
    E: RequestExecutor + 'static,
{
    let request_count = usize::try_from(plan.request_count).unwrap_or(usize::MAX);
    let slots = Arc::new(Semaphore::new(
        plan.concurrency_limit.clamp(1, Semaphore::MAX_PERMITS),
    ));
    let pacing = plan
        .rate_limit
        .and_then(PacingGate::per_second)
        .map(Arc::new);

    let pacing_label = pacing.as_ref().map_or_else(
        || "unlimited".to_owned(),
        |gate| format!("1 per {:?}", gate.min_interval()),
    );
    debug!(
        "Starting batch: {} request(s), concurrency {}, rate {}",
        request_count, plan.concurrency_limit, pacing_label
    );

    let mut handles = Vec::with_capacity(request_count);
    for _ in 0..request_count {
        let executor = Arc::clone(&executor);
        let slots = Arc::clone(&slots);
        let pacing = pacing.clone();
        handles.push(tokio::spawn(async move {
            if let Some(gate) = pacing.as_ref() {
                gate.admit().await;
            }
            let _slot = match slots.acquire_owned().await {
                Ok(permit) => permit,
                Err(err) => {
                    return RequestOutcome::transport_failure(
                        Duration::ZERO,
                        format!("TaskError: {}", err),
                    );
                }
            };
            executor.execute().await
        }));
    }

    let mut outcomes = Vec::with_capacity(request_count);
    for handle in handles {
        match handle.await {
            Ok(outcome) => outcomes.push(outcome),
            Err(err) => {
                error!("Request task failed: {}", err);
                outcomes.push(RequestOutcome::transport_failure(
                    Duration::ZERO,
                    format!("TaskError: {}", err),
                ));
            }
        }
    }

    debug!("Batch finished: {} outcome(s)", outcomes.len());
    outcomes
}
