//! Request outcomes and the batch summary reducer.
mod summary;
mod types;


pub use summary::reduce;
pub use types::{BatchSummary, LatencyStats, RequestOutcome, is_success_status};
