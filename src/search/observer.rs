use super::{ProbePlan, ProbeResult};

/// Progress hooks for a running search. All methods default to no-ops.
pub trait SearchObserver {
    fn on_probe_start(&mut self, _plan: ProbePlan) {}

    fn on_probe_complete(&mut self, _result: &ProbeResult) {}

    fn on_verification_start(&mut self, _plan: ProbePlan) {}

    fn on_verification_complete(&mut self, _result: &ProbeResult) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl SearchObserver for SilentObserver {}
