use crate::core::PollConfig;
use crate::errors::Result;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::debug;

/// Outcome of one probe evaluation (or of a whole poll).
///
/// `Pending` is transient: a probe returns it to request another tick,
/// and `BoundedPoller::poll` never returns it to the caller. `Found`
/// and `TimedOut` are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollResult<T> {
    Found(T),
    Pending,
    TimedOut,
}

impl<T> PollResult<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, PollResult::Found(_))
    }

    pub fn into_found(self) -> Option<T> {
        match self {
            PollResult::Found(value) => Some(value),
            _ => None,
        }
    }
}

/// Repeatedly evaluates a probe until it yields a value or a deadline
/// elapses.
///
/// Polling (not event subscription) is deliberate: the driver is a
/// synchronous, stateless query interface with no push notifications
/// for DOM mutation. The sleep between ticks is the only suspension
/// point in the loop.
#[derive(Debug, Clone)]
pub struct BoundedPoller {
    timeout: Duration,
    interval: Duration,
}

impl BoundedPoller {
    /// `timeout` must be strictly greater than zero.
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        debug_assert!(!timeout.is_zero(), "poll deadline must be > 0");
        Self { timeout, interval }
    }

    pub fn from_config(config: &PollConfig) -> Self {
        Self::new(config.timeout(), config.interval())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run the probe once per tick until it reports `Found`, an error,
    /// or the deadline passes.
    ///
    /// A `Found` is returned immediately with no extra wait. The
    /// deadline is checked before every sleep, so the loop never
    /// oversleeps the budget by more than one interval. Probe errors
    /// abort the poll at once; transient absence is the probe's
    /// `Pending`, not an error.
    pub async fn poll<T, F, Fut>(&self, mut probe: F) -> Result<PollResult<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<PollResult<T>>>,
    {
        let start = Instant::now();
        loop {
            match probe().await? {
                PollResult::Found(value) => return Ok(PollResult::Found(value)),
                PollResult::TimedOut => return Ok(PollResult::TimedOut),
                PollResult::Pending => {}
            }

            let elapsed = start.elapsed();
            if elapsed >= self.timeout {
                debug!("poll deadline of {:?} elapsed", self.timeout);
                return Ok(PollResult::TimedOut);
            }
            tokio::time::sleep(self.interval).await;
        }
    }
}
