use super::ProbeResult;

/// A probe passed at a concurrency at or above one that failed.
///
/// `passed_at == failed_at` means the same level gave both verdicts, as when
/// a verification probe fails at an accepted level.
///
/// Both policies assume the success rate never rises with concurrency. A
/// violation records evidence against that assumption without altering the
/// search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonotonicityViolation {
    pub passed_at: u64,
    pub failed_at: u64,
}

pub(super) fn find_violation(
    history: &[ProbeResult],
    latest: &ProbeResult,
) -> Option<MonotonicityViolation> {
    if latest.passed {
        history
            .iter()
            .filter(|earlier| !earlier.passed && earlier.concurrency <= latest.concurrency)
            .map(|earlier| earlier.concurrency)
            .min()
            .map(|failed_at| MonotonicityViolation {
                passed_at: latest.concurrency,
                failed_at,
            })
    } else {
        history
            .iter()
            .filter(|earlier| earlier.passed && earlier.concurrency >= latest.concurrency)
            .map(|earlier| earlier.concurrency)
            .max()
            .map(|passed_at| MonotonicityViolation {
                passed_at,
                failed_at: latest.concurrency,
            })
    }
}
