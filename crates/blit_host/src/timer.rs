//! # Timers
//!
//! Two flavors of the same schedule (initial delay, then a fixed period):
//!
//! - [`Cadence`]: a channel to `select!` on from a thread the caller owns.
//!   Used by the event-loop host so both loops share one thread.
//! - [`RecurringTimer`]: a worker thread that runs a callback on every tick
//!   until stopped.
//!
//! Ticks that fall behind are dropped, not queued: a slow callback sees the
//! next tick, never a burst.

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{after, select, tick, Receiver, Sender};

use crate::error::{HostError, HostResult};

/// Initial-delay-then-periodic tick channel.
#[derive(Debug)]
pub struct Cadence {
    period: Duration,
    receiver: Receiver<Instant>,
    started: bool,
    fired: u64,
    overdue: u64,
}

impl Cadence {
    /// Creates a cadence that first fires after `initial_delay`.
    #[must_use]
    pub fn new(initial_delay: Duration, period: Duration) -> Self {
        Self {
            period,
            receiver: after(initial_delay),
            started: false,
            fired: 0,
            overdue: 0,
        }
    }

    /// Channel to wait on.
    #[must_use]
    pub fn receiver(&self) -> &Receiver<Instant> {
        &self.receiver
    }

    /// Must be called after every receive with the instant the tick carried;
    /// switches from the initial delay to the periodic ticker on the first
    /// one.
    ///
    /// Returns how many whole periods passed between `scheduled` and now.
    /// The ticker drops those ticks instead of queueing them.
    pub fn fired(&mut self, scheduled: Instant) -> u64 {
        self.fired += 1;
        if !self.started {
            self.started = true;
            self.receiver = tick(self.period);
            return 0;
        }

        let late = scheduled.elapsed().as_nanos();
        let period = self.period.as_nanos().max(1);
        let overdue = u64::try_from(late / period).unwrap_or(u64::MAX);
        self.overdue = self.overdue.saturating_add(overdue);
        overdue
    }

    /// Ticks received so far.
    #[must_use]
    pub const fn fire_count(&self) -> u64 {
        self.fired
    }

    /// Ticks that fell due while the receiver was busy and were dropped.
    #[must_use]
    pub const fn overdue_count(&self) -> u64 {
        self.overdue
    }
}

/// What a stopped [`RecurringTimer`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerReport {
    /// Callback invocations.
    pub fired: u64,
    /// Ticks dropped because a callback overran the period.
    pub overdue: u64,
}

/// A callback fired on its own thread at a fixed period.
#[derive(Debug)]
pub struct RecurringTimer {
    name: String,
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<TimerReport>>,
}

impl RecurringTimer {
    /// Starts the timer.
    ///
    /// `callback` runs first after `initial_delay`, then every `period`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Spawn`] if the worker thread cannot be created.
    pub fn start<F>(
        name: impl Into<String>,
        initial_delay: Duration,
        period: Duration,
        mut callback: F,
    ) -> HostResult<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let name = name.into();
        // Dropping the sender is the stop signal.
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(0);

        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                let mut cadence = Cadence::new(initial_delay, period);
                loop {
                    let ticks = cadence.receiver().clone();
                    select! {
                        recv(stop_rx) -> _ => break,
                        recv(ticks) -> scheduled => {
                            cadence.fired(scheduled.unwrap_or_else(|_| Instant::now()));
                            callback();
                        }
                    }
                }
                TimerReport {
                    fired: cadence.fire_count(),
                    overdue: cadence.overdue_count(),
                }
            })
            .map_err(|source| HostError::Spawn {
                name: name.clone(),
                source,
            })?;

        tracing::debug!(timer = %name, ?initial_delay, ?period, "timer started");
        Ok(Self {
            name,
            stop: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// Stops the timer and waits for a running callback to finish.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Panicked`] if the callback panicked.
    pub fn stop(mut self) -> HostResult<TimerReport> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> HostResult<TimerReport> {
        drop(self.stop.take());
        let Some(handle) = self.handle.take() else {
            return Ok(TimerReport::default());
        };
        let report = handle
            .join()
            .map_err(|_| HostError::Panicked(self.name.clone()))?;
        tracing::debug!(
            timer = %self.name,
            fired = report.fired,
            overdue = report.overdue,
            "timer stopped"
        );
        Ok(report)
    }
}

impl Drop for RecurringTimer {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            tracing::warn!(%err, "timer did not stop cleanly");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_timer_fires_and_stops() {
        let count = Arc::new(AtomicU64::new(0));
        let seen = Arc::clone(&count);

        let timer = RecurringTimer::start(
            "test-timer",
            Duration::ZERO,
            Duration::from_millis(2),
            move || {
                seen.fetch_add(1, Ordering::Relaxed);
            },
        )
        .unwrap();

        thread::sleep(Duration::from_millis(50));
        let report = timer.stop().unwrap();

        assert!(report.fired >= 2, "expected several ticks, got {}", report.fired);
        assert_eq!(report.fired, count.load(Ordering::Relaxed));

        thread::sleep(Duration::from_millis(10));
        assert_eq!(report.fired, count.load(Ordering::Relaxed), "no ticks after stop");
    }

    #[test]
    fn test_initial_delay_respected() {
        let count = Arc::new(AtomicU64::new(0));
        let seen = Arc::clone(&count);

        let timer = RecurringTimer::start(
            "delayed-timer",
            Duration::from_secs(10),
            Duration::from_millis(1),
            move || {
                seen.fetch_add(1, Ordering::Relaxed);
            },
        )
        .unwrap();

        thread::sleep(Duration::from_millis(20));
        assert_eq!(timer.stop().unwrap(), TimerReport::default());
        assert_eq!(count.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_slow_callback_drops_ticks() {
        let timer = RecurringTimer::start(
            "slow-timer",
            Duration::ZERO,
            Duration::from_millis(2),
            || thread::sleep(Duration::from_millis(15)),
        )
        .unwrap();

        thread::sleep(Duration::from_millis(100));
        let report = timer.stop().unwrap();

        assert!(report.fired >= 2);
        assert!(report.overdue > 0, "overran periods were not counted");
    }

    #[test]
    fn test_cadence_switches_to_period() {
        let mut cadence = Cadence::new(Duration::ZERO, Duration::from_millis(1));
        let first = cadence.receiver().recv().unwrap();
        assert_eq!(cadence.fired(first), 0);
        let second = cadence.receiver().recv().unwrap();
        cadence.fired(second);
        assert_eq!(cadence.fire_count(), 2);
    }

    #[test]
    fn test_cadence_counts_overdue_periods() {
        let mut cadence = Cadence::new(Duration::ZERO, Duration::from_millis(2));
        let first = cadence.receiver().recv().unwrap();
        cadence.fired(first);

        let scheduled = cadence.receiver().recv().unwrap();
        thread::sleep(Duration::from_millis(11));
        let overdue = cadence.fired(scheduled);

        assert!(overdue >= 5, "expected at least 5 missed periods, got {overdue}");
        assert_eq!(cadence.overdue_count(), overdue);
    }
}
