//! Request execution and bounded-concurrency batches.
mod batch;
mod executor;
mod pacing;
mod target;

#[cfg(test)]
mod tests;

pub use batch::{BatchPlan, run_batch};
pub use executor::{ClientSettings, HttpExecutor, RequestExecutor};
pub use pacing::PacingGate;
pub use target::{Credential, Target};
