//! Trailing-edge debouncing over an injected timer source.

use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::trace;

pub type Task = Box<dyn FnOnce()>;

/// One-shot timers.
pub trait Scheduler {
    type Handle;

    fn schedule(&self, delay: Duration, task: Task) -> Self::Handle;
    /// Cancelling a timer that already fired is a no-op.
    fn cancel(&self, handle: Self::Handle);
}

/// Runs an action once calls have stopped arriving for `wait`.
///
/// Every call cancels the pending timer and starts a new one, so a burst of
/// calls produces a single run after the last call of the burst.
pub struct Debouncer<S: Scheduler> {
    inner: Arc<Inner<S>>,
}

struct Inner<S: Scheduler> {
    scheduler: S,
    wait: Duration,
    pending: Mutex<Option<S::Handle>>,
    action: Mutex<Box<dyn FnMut()>>,
}

impl<S: Scheduler> Clone for Debouncer<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> Debouncer<S>
where
    S: Scheduler + 'static,
    S::Handle: 'static,
{
    pub fn new(scheduler: S, wait: Duration, action: impl FnMut() + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                scheduler,
                wait,
                pending: Mutex::new(None),
                action: Mutex::new(Box::new(action)),
            }),
        }
    }

    pub fn call(&self) {
        self.cancel();
        let weak: Weak<Inner<S>> = Arc::downgrade(&self.inner);
        let handle = self.inner.scheduler.schedule(
            self.inner.wait,
            Box::new(move || {
                // the debouncer may have been dropped while the timer ran
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                inner.pending.lock().take();
                trace!("debounce window elapsed");
                let mut action = inner.action.lock();
                (*action)();
            }),
        );
        *self.inner.pending.lock() = Some(handle);
        trace!(wait_ms = self.inner.wait.as_millis() as u64, "debounce scheduled");
    }

    /// Drop the pending run, if any.
    pub fn cancel(&self) {
        let previous = self.inner.pending.lock().take();
        if let Some(handle) = previous {
            self.inner.scheduler.cancel(handle);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.inner.pending.lock().is_some()
    }
}

/// Delay in whole milliseconds for a JS timer, saturating at `i32::MAX`.
pub fn timeout_millis(delay: Duration) -> i32 {
    i32::try_from(delay.as_millis()).unwrap_or(i32::MAX)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

struct Timer {
    id: u64,
    due: Duration,
    task: Task,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    next_id: u64,
    timers: Vec<Timer>,
}

/// Scheduler driven by a virtual clock. Nothing fires until
/// [`advance`](ManualScheduler::advance) moves time past a timer's due time.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    state: Arc<Mutex<ManualState>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.state.lock().now
    }

    pub fn pending(&self) -> usize {
        self.state.lock().timers.len()
    }

    /// Move the clock forward, firing due timers in order. Timers scheduled
    /// by a firing task run in the same call if they fall due in time.
    pub fn advance(&self, by: Duration) {
        let target = self.now() + by;
        loop {
            let next = {
                let mut st = self.state.lock();
                let due = st
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= target)
                    .min_by_key(|(_, t)| (t.due, t.id))
                    .map(|(i, _)| i);
                due.map(|i| {
                    let timer = st.timers.remove(i);
                    st.now = timer.due;
                    timer.task
                })
            };
            // run without the lock so tasks can schedule more timers
            match next {
                Some(task) => task(),
                None => break,
            }
        }
        self.state.lock().now = target;
    }
}

impl Scheduler for ManualScheduler {
    type Handle = TimerId;

    fn schedule(&self, delay: Duration, task: Task) -> TimerId {
        let mut st = self.state.lock();
        let id = st.next_id;
        st.next_id += 1;
        let due = st.now + delay;
        st.timers.push(Timer { id, due, task });
        TimerId(id)
    }

    fn cancel(&self, handle: TimerId) {
        self.state.lock().timers.retain(|t| t.id != handle.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const WAIT: Duration = Duration::from_millis(50);

    fn counting(scheduler: &ManualScheduler) -> (Debouncer<ManualScheduler>, Arc<AtomicUsize>) {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let debouncer = Debouncer::new(scheduler.clone(), WAIT, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (debouncer, runs)
    }

    #[test]
    fn burst_collapses_to_one_trailing_run() {
        let clock = ManualScheduler::new();
        let (debouncer, runs) = counting(&clock);

        for _ in 0..5 {
            debouncer.call();
            clock.advance(Duration::from_millis(10));
        }
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert!(debouncer.is_pending());

        // last call was at t=40ms, so it fires at t=90ms
        clock.advance(Duration::from_millis(39));
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        clock.advance(Duration::from_millis(1));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());

        clock.advance(Duration::from_secs(1));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn separated_calls_run_separately() {
        let clock = ManualScheduler::new();
        let (debouncer, runs) = counting(&clock);
        debouncer.call();
        clock.advance(Duration::from_millis(60));
        debouncer.call();
        clock.advance(Duration::from_millis(60));
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn cancel_drops_pending_run() {
        let clock = ManualScheduler::new();
        let (debouncer, runs) = counting(&clock);
        debouncer.call();
        debouncer.cancel();
        assert_eq!(clock.pending(), 0);
        clock.advance(Duration::from_millis(100));
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn dropped_debouncer_does_not_run() {
        let clock = ManualScheduler::new();
        let (debouncer, runs) = counting(&clock);
        debouncer.call();
        drop(debouncer);
        clock.advance(Duration::from_millis(100));
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn timeout_millis_saturates() {
        assert_eq!(timeout_millis(WAIT), 50);
        assert_eq!(timeout_millis(Duration::from_millis(u64::MAX)), i32::MAX);
        assert_eq!(timeout_millis(Duration::from_millis(i32::MAX as u64 + 1)), i32::MAX);
    }

    #[test]
    fn timers_fire_in_due_order() {
        let clock = ManualScheduler::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for (name, ms) in [("b", 20), ("a", 10), ("c", 20)] {
            let log = Arc::clone(&log);
            clock.schedule(
                Duration::from_millis(ms),
                Box::new(move || log.lock().push(name)),
            );
        }
        clock.advance(Duration::from_millis(25));
        assert_eq!(*log.lock(), ["a", "b", "c"]);
        assert_eq!(clock.now(), Duration::from_millis(25));
    }
}
