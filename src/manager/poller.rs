//! Status poller.
//!
//! Fetches the add-on catalog until nothing is pending. The fetch itself and
//! the wait between fetches run as tokio tasks owned by the manager; this
//! type only decides what happens next. Every `start()`/`stop()` bumps a
//! generation counter so results and timers from an earlier run are ignored.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::config::PollConfig;
use crate::api::models::Rockon;

/// True if any add-on has backend work in flight
pub fn pending_ops(rockons: &[Rockon]) -> bool {
    rockons.iter().any(Rockon::is_pending)
}

/// Wait before the next fetch, given how long the last one took
pub fn next_delay(elapsed: Duration, interval: Duration) -> Duration {
    if elapsed > interval {
        Duration::ZERO
    } else {
        interval - elapsed
    }
}

/// Outcome of one fetch as the poller sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Loaded { pending: bool },
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollDecision {
    /// Something is pending; fetch again after the delay
    Reschedule(Duration),
    /// Nothing is pending
    Stop,
    /// Fetch failed; try again after the delay
    Retry { attempt: u32, delay: Duration },
    /// Too many consecutive failures
    GiveUp,
}

pub struct Poller {
    interval: Duration,
    retry_limit: u32,
    generation: u64,
    active: bool,
    failures: u32,
    timer: Option<JoinHandle<()>>,
}

impl Poller {
    pub fn new(config: &PollConfig) -> Self {
        Self {
            interval: config.interval(),
            retry_limit: config.retry_limit,
            generation: 0,
            active: false,
            failures: 0,
            timer: None,
        }
    }

    /// Begin a polling run; the caller fetches immediately with the returned
    /// generation
    pub fn start(&mut self) -> u64 {
        self.cancel_timer();
        self.generation += 1;
        self.active = true;
        self.failures = 0;
        debug!("Polling started (generation {})", self.generation);
        self.generation
    }

    pub fn stop(&mut self) {
        if self.active {
            debug!("Polling stopped (generation {})", self.generation);
        }
        self.cancel_timer();
        self.generation += 1;
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a fetch result or timer of this generation still matters
    pub fn is_current(&self, generation: u64) -> bool {
        self.active && generation == self.generation
    }

    /// Keep the timer task so `stop()` can cancel it
    pub fn arm(&mut self, timer: JoinHandle<()>) {
        self.cancel_timer();
        self.timer = Some(timer);
    }

    /// Decide what follows a fetch; `None` for a stale result
    pub fn on_fetched(
        &mut self,
        generation: u64,
        elapsed: Duration,
        outcome: FetchOutcome,
    ) -> Option<PollDecision> {
        if !self.is_current(generation) {
            debug!("Discarding stale poll result (generation {})", generation);
            return None;
        }

        let decision = match outcome {
            FetchOutcome::Loaded { pending: true } => {
                self.failures = 0;
                PollDecision::Reschedule(next_delay(elapsed, self.interval))
            }
            FetchOutcome::Loaded { pending: false } => {
                self.failures = 0;
                self.active = false;
                self.cancel_timer();
                info!("No pending rock-on operations, polling stopped");
                PollDecision::Stop
            }
            FetchOutcome::Failed => {
                self.failures += 1;
                if self.failures > self.retry_limit {
                    self.active = false;
                    self.cancel_timer();
                    warn!("Polling gave up after {} failed attempts", self.failures);
                    PollDecision::GiveUp
                } else {
                    warn!("Poll attempt failed ({}/{})", self.failures, self.retry_limit);
                    PollDecision::Retry {
                        attempt: self.failures,
                        delay: next_delay(elapsed, self.interval),
                    }
                }
            }
        };
        Some(decision)
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::session::tests::rockon;

    fn poller() -> Poller {
        Poller::new(&PollConfig::default())
    }

    const INTERVAL: Duration = Duration::from_millis(15_000);

    #[test]
    fn pending_ops_checks_state_and_status() {
        let mut idle = rockon(false);
        idle.status = "started".to_string();
        assert!(!pending_ops(&[idle.clone()]));

        let mut starting = idle.clone();
        starting.status = "pending_start".to_string();
        assert!(pending_ops(&[idle.clone(), starting]));

        let mut installing = idle;
        installing.state = "pending_install".to_string();
        assert!(pending_ops(&[installing]));
        assert!(!pending_ops(&[]));
    }

    #[test]
    fn delay_adapts_to_fetch_time() {
        assert_eq!(next_delay(Duration::from_millis(500), INTERVAL), Duration::from_millis(14_500));
        assert_eq!(next_delay(INTERVAL, INTERVAL), Duration::ZERO);
        assert_eq!(next_delay(Duration::from_millis(20_000), INTERVAL), Duration::ZERO);
    }

    #[test]
    fn polls_while_pending_then_stops() {
        let mut poller = poller();
        let generation = poller.start();

        let decision = poller.on_fetched(
            generation,
            Duration::from_millis(1_000),
            FetchOutcome::Loaded { pending: true },
        );
        assert_eq!(decision, Some(PollDecision::Reschedule(Duration::from_millis(14_000))));
        assert!(poller.is_active());

        let decision =
            poller.on_fetched(generation, Duration::ZERO, FetchOutcome::Loaded { pending: false });
        assert_eq!(decision, Some(PollDecision::Stop));
        assert!(!poller.is_active());
    }

    #[test]
    fn results_after_stop_are_discarded() {
        let mut poller = poller();
        let generation = poller.start();
        poller.stop();

        assert_eq!(
            poller.on_fetched(generation, Duration::ZERO, FetchOutcome::Loaded { pending: true }),
            None
        );

        let restarted = poller.start();
        assert_ne!(restarted, generation);
        assert!(!poller.is_current(generation));
        assert!(poller.is_current(restarted));
    }

    #[test]
    fn failures_retry_up_to_limit() {
        let mut poller = poller();
        let generation = poller.start();

        for attempt in 1..=3 {
            assert_eq!(
                poller.on_fetched(generation, Duration::ZERO, FetchOutcome::Failed),
                Some(PollDecision::Retry { attempt, delay: INTERVAL })
            );
        }
        assert_eq!(
            poller.on_fetched(generation, Duration::ZERO, FetchOutcome::Failed),
            Some(PollDecision::GiveUp)
        );
        assert!(!poller.is_active());
    }

    #[test]
    fn success_resets_failure_count() {
        let mut poller = poller();
        let generation = poller.start();
        poller.on_fetched(generation, Duration::ZERO, FetchOutcome::Failed);
        poller.on_fetched(generation, Duration::ZERO, FetchOutcome::Loaded { pending: true });

        assert_eq!(
            poller.on_fetched(generation, Duration::ZERO, FetchOutcome::Failed),
            Some(PollDecision::Retry { attempt: 1, delay: INTERVAL })
        );
    }

    #[tokio::test]
    async fn stop_cancels_armed_timer() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        let mut poller = poller();
        poller.start();
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        poller.arm(tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            flag.store(true, Ordering::SeqCst);
        }));
        poller.stop();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }
}
