//! Single-shot, re-armable debounce timer.
//!
//! Editors frequently emit several events for one save. The [`Debouncer`]
//! holds at most one [`PendingReload`]; every [`Debouncer::notify`] pushes its
//! deadline back, so only the last event of a burst survives.
//!
//! The debouncer does not own a thread or a clock. Callers pass `now` in and
//! ask for the [`Debouncer::deadline`] to wait on, which keeps the timing
//! deterministic under test.

use std::time::{Duration, Instant};

/// Quiet period used when none is configured.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(100);

/// An armed reload waiting for its quiet period to elapse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingReload {
    /// When the reload fires unless re-armed first.
    pub deadline: Instant,
}

/// Coalesces bursts of notifications into a single reload request.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    pending: Option<PendingReload>,
}

impl Debouncer {
    /// Create a disarmed debouncer with the given quiet period.
    #[must_use]
    pub const fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    /// The configured quiet period.
    #[must_use]
    pub const fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// Arm the timer, or restart it if already armed.
    pub fn notify(&mut self, now: Instant) {
        self.pending = Some(PendingReload {
            deadline: now + self.quiet,
        });
    }

    /// Returns `true` if a reload is pending.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending reload fires, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.deadline)
    }

    /// Disarm without firing.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Fire the pending reload if its deadline has passed.
    ///
    /// Returns `true` exactly once per armed period; the timer is disarmed
    /// when it fires.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(p) if now >= p.deadline => {
                self.pending = None;
                true
            }

            _ => false,
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const QUIET: Duration = Duration::from_millis(100);

    #[test]
    fn test_default_quiet_period() {
        let debouncer = Debouncer::default();
        assert_eq!(debouncer.quiet_period(), Duration::from_millis(100));
        assert!(!debouncer.is_armed());
    }

    #[test]
    fn test_fires_once_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);

        debouncer.notify(start);
        assert!(!debouncer.fire_if_due(start + Duration::from_millis(99)));
        assert!(debouncer.fire_if_due(start + QUIET));
        assert!(!debouncer.fire_if_due(start + QUIET * 2));
        assert!(!debouncer.is_armed());
    }

    #[test]
    fn test_renotify_restarts_countdown() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);

        debouncer.notify(start);
        debouncer.notify(start + Duration::from_millis(80));

        assert!(!debouncer.fire_if_due(start + Duration::from_millis(120)));
        assert_eq!(
            debouncer.deadline(),
            Some(start + Duration::from_millis(180))
        );
        assert!(debouncer.fire_if_due(start + Duration::from_millis(180)));
    }

    #[test]
    fn test_cancel_disarms() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(QUIET);

        debouncer.notify(start);
        debouncer.cancel();
        assert!(!debouncer.fire_if_due(start + QUIET * 10));
    }

    proptest! {
        /// A burst of notifies, each within the quiet period of the previous
        /// one, fires exactly once and never before last + quiet.
        #[test]
        fn burst_fires_exactly_once(gaps in prop::collection::vec(0u64..100, 1..20)) {
            let start = Instant::now();
            let mut debouncer = Debouncer::new(QUIET);

            let mut now = start;
            let mut fired = 0;
            for gap in &gaps {
                now += Duration::from_millis(*gap);
                if debouncer.fire_if_due(now) {
                    fired += 1;
                }
                debouncer.notify(now);
            }
            let last = now;

            // Walk the clock forward in 1ms steps well past the deadline.
            for step in 0..300u64 {
                let t = last + Duration::from_millis(step);
                if debouncer.fire_if_due(t) {
                    prop_assert!(t >= last + QUIET);
                    fired += 1;
                }
            }

            prop_assert_eq!(fired, 1);
        }
    }
}
