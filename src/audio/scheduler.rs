use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Outcome of holding for one beat.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Hold {
    Elapsed,
    Cancelled,
}

/// Shared flag interrupting a playback between tokens or during a hold.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (lock, condvar) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner) = true;
        condvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        let (lock, _) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block for `duration` unless cancelled first.
    fn wait_timeout(&self, duration: Duration) -> Hold {
        let (lock, condvar) = &*self.inner;
        let deadline = Instant::now() + duration;
        let mut cancelled = lock.lock().unwrap_or_else(PoisonError::into_inner);
        // loop over spurious wake-ups
        while !*cancelled {
            let now = Instant::now();
            if now >= deadline {
                return Hold::Elapsed;
            }
            let (guard, _timeout) = condvar
                .wait_timeout(cancelled, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            cancelled = guard;
        }
        Hold::Cancelled
    }
}

/// Suspension point of the sequencer, called once per token.
pub trait Scheduler: Send + Sync {
    fn hold(&self, duration: Duration, cancel: &CancellationToken) -> Hold;
}

/// Blocks the calling thread for the whole beat.
#[derive(Debug, Default, Clone, Copy)]
pub struct SleepScheduler;

impl Scheduler for SleepScheduler {
    fn hold(&self, duration: Duration, cancel: &CancellationToken) -> Hold {
        cancel.wait_timeout(duration)
    }
}

/// Returns immediately and keeps the requested holds, for dry runs and tests.
#[derive(Debug, Default)]
pub struct RecordingScheduler {
    holds: Mutex<Vec<Duration>>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn holds(&self) -> Vec<Duration> {
        self.holds
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn total(&self) -> Duration {
        self.holds().iter().sum()
    }
}

impl Scheduler for RecordingScheduler {
    fn hold(&self, duration: Duration, cancel: &CancellationToken) -> Hold {
        if cancel.is_cancelled() {
            return Hold::Cancelled;
        }
        self.holds
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);
        Hold::Elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_sleep_scheduler_waits() {
        let cancel = CancellationToken::new();
        let start = Instant::now();
        let hold = SleepScheduler.hold(Duration::from_millis(30), &cancel);
        assert_eq!(hold, Hold::Elapsed);
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_sleep_scheduler_interrupted() {
        let cancel = CancellationToken::new();
        let canceller = cancel.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            canceller.cancel();
        });
        let start = Instant::now();
        let hold = SleepScheduler.hold(Duration::from_secs(10), &cancel);
        handle.join().unwrap();
        assert_eq!(hold, Hold::Cancelled);
        assert!(start.elapsed() < Duration::from_secs(5));
        assert!(cancel.is_cancelled());
    }

    #[test]
    fn test_recording_scheduler() {
        let scheduler = RecordingScheduler::new();
        let cancel = CancellationToken::new();
        assert_eq!(
            scheduler.hold(Duration::from_millis(500), &cancel),
            Hold::Elapsed
        );
        assert_eq!(
            scheduler.hold(Duration::from_millis(250), &cancel),
            Hold::Elapsed
        );
        assert_eq!(scheduler.total(), Duration::from_millis(750));
        cancel.cancel();
        assert_eq!(
            scheduler.hold(Duration::from_millis(500), &cancel),
            Hold::Cancelled
        );
        assert_eq!(scheduler.holds().len(), 2);
    }
}
