use std::time::Duration;

use crate::config::DispatcherConfig;

/// Shortest sleep between sweeps. Never zero.
const MIN_BACKOFF: Duration = Duration::from_millis(1);

/// Limits on how long a selection may search for capacity.
///
/// With neither `max_attempts` nor `deadline` set the search never gives up.
/// The backoff bounds only apply to [`Dispatcher::acquire`](super::Dispatcher::acquire),
/// which sleeps between full sweeps of the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinPolicy {
    /// Maximum candidates checked before failing.
    pub max_attempts: Option<u64>,
    /// Maximum time spent searching before failing.
    pub deadline: Option<Duration>,
    /// First sleep after a sweep finds nothing.
    pub backoff_initial: Duration,
    /// Ceiling for the doubling backoff.
    pub backoff_max: Duration,
}

impl SpinPolicy {
    /// Search until capacity appears.
    pub fn unbounded() -> Self {
        Self {
            max_attempts: None,
            deadline: None,
            backoff_initial: MIN_BACKOFF,
            backoff_max: Duration::from_millis(50),
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u64) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set the backoff bounds. `initial` is raised to at least 1 ms and
    /// `max` to at least `initial`.
    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        let initial = initial.max(MIN_BACKOFF);
        self.backoff_initial = initial;
        self.backoff_max = max.max(initial);
        self
    }

    /// True when neither limit is set.
    pub fn is_unbounded(&self) -> bool {
        self.max_attempts.is_none() && self.deadline.is_none()
    }

    pub(crate) fn attempts_exhausted(&self, attempts: u64) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }

    /// Time left before the deadline, `None` when there is no deadline.
    pub(crate) fn remaining(&self, elapsed: Duration) -> Option<Duration> {
        self.deadline.map(|deadline| deadline.saturating_sub(elapsed))
    }

    pub(crate) fn next_backoff(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.backoff_max)
    }
}

impl Default for SpinPolicy {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl From<&DispatcherConfig> for SpinPolicy {
    fn from(config: &DispatcherConfig) -> Self {
        let mut policy = Self::unbounded().with_backoff(
            Duration::from_millis(config.backoff_initial_ms),
            Duration::from_millis(config.backoff_max_ms),
        );
        policy.max_attempts = config.max_attempts;
        policy.deadline = config.deadline_ms.map(Duration::from_millis);
        policy
    }
}
