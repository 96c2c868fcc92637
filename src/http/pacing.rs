use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};

/// Shared admission gate spacing dispatches at least `min_interval` apart.
///
/// The lock is held while sleeping, so admission decisions are serialized
/// while the admitted requests still run concurrently.
#[derive(Debug)]
pub struct PacingGate {
    min_interval: Duration,
    last_dispatch: Mutex<Option<Instant>>,
}

impl PacingGate {
    /// Gate for `rate` dispatches per second. Returns `None` for rates that
    /// mean "unlimited" (zero, negative, non-finite).
    #[must_use]
    pub fn per_second(rate: f64) -> Option<Self> {
        if !rate.is_finite() || rate <= 0.0 {
            return None;
        }
        let min_interval = Duration::try_from_secs_f64(1.0 / rate).ok()?;
        Some(Self {
            min_interval,
            last_dispatch: Mutex::new(None),
        })
    }

    #[must_use]
    pub const fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits until this dispatch may proceed, then records its dispatch time.
    pub async fn admit(&self) {
        let mut last_dispatch = self.last_dispatch.lock().await;
        let now = Instant::now();
        let dispatch_at = match *last_dispatch {
            Some(previous) => {
                let elapsed = now.saturating_duration_since(previous);
                if elapsed < self.min_interval {
                    let shortfall = self.min_interval.saturating_sub(elapsed);
                    sleep(shortfall).await;
                    now.checked_add(shortfall).unwrap_or(now)
                } else {
                    now
                }
            }
            None => now,
        };
        *last_dispatch = Some(dispatch_at);
    }
}
