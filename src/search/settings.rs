use std::time::Duration;

use crate::args::{check_rate, check_threshold};
use crate::error::{AppError, AppResult, ValidationError};

/// Parameters shared by the binary and linear policies.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    pub start: u64,
    pub max: u64,
    /// Linear sweep increment.
    pub step: u64,
    /// Success-rate percentage a probe must reach to pass.
    pub threshold: f64,
    pub requests_per_probe: u64,
    pub rate_limit: Option<f64>,
    /// Delay between consecutive probes.
    pub pause: Duration,
    pub stop_on_failure: bool,
    /// Run a double-size confirmation probe at the binary-search result.
    pub verify: bool,
}

impl SearchSettings {
    /// # Errors
    ///
    /// Returns an error when the search range, step, threshold, or rate is
    /// invalid.
    pub fn validate(&self) -> AppResult<()> {
        if self.start == 0 {
            return Err(AppError::validation(ValidationError::ConcurrencyZero));
        }
        if self.max < self.start {
            return Err(AppError::validation(ValidationError::MaxBelowStart {
                start: self.start,
                max: self.max,
            }));
        }
        if self.step == 0 {
            return Err(AppError::validation(ValidationError::StepZero));
        }
        validate_threshold(self.threshold)?;
        if let Some(rate) = self.rate_limit {
            validate_rate(rate)?;
        }
        Ok(())
    }

    #[must_use]
    pub const fn verification_requests(&self) -> u64 {
        self.requests_per_probe.saturating_mul(2)
    }
}

/// Parameters of a fixed-combination sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepSettings {
    pub concurrency_levels: Vec<u64>,
    /// Dispatches per second; `0` means unlimited.
    pub rates: Vec<f64>,
    pub requests_per_probe: u64,
    pub threshold: f64,
    pub pause: Duration,
    /// Probe only the first concurrency level with the first rate.
    pub single_test: bool,
}

impl SweepSettings {
    /// # Errors
    ///
    /// Returns an error when a list is empty or contains an invalid value.
    pub fn validate(&self) -> AppResult<()> {
        if self.concurrency_levels.is_empty() {
            return Err(AppError::validation(ValidationError::EmptyConcurrencyList));
        }
        if self.concurrency_levels.contains(&0) {
            return Err(AppError::validation(ValidationError::ConcurrencyZero));
        }
        if self.rates.is_empty() {
            return Err(AppError::validation(ValidationError::EmptyRateList));
        }
        for rate in &self.rates {
            validate_rate(*rate)?;
        }
        validate_threshold(self.threshold)
    }

    /// Combinations in probe order: concurrency-major, then rate.
    #[must_use]
    pub fn combinations(&self) -> Vec<(u64, f64)> {
        if self.single_test {
            return self
                .concurrency_levels
                .first()
                .zip(self.rates.first())
                .map(|(concurrency, rate)| vec![(*concurrency, *rate)])
                .unwrap_or_default();
        }
        self.concurrency_levels
            .iter()
            .flat_map(|concurrency| self.rates.iter().map(|rate| (*concurrency, *rate)))
            .collect()
    }
}

fn validate_threshold(threshold: f64) -> AppResult<()> {
    check_threshold(threshold)?;
    Ok(())
}

fn validate_rate(rate: f64) -> AppResult<()> {
    check_rate(rate)?;
    Ok(())
}
