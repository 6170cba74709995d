//! Cancellable one-shot delayed callbacks, one thread per timer.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use log::debug;

use crate::error::LineError;
use crate::types::TimerId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Pending,
    Cancelled,
    Fired,
}

/// Shared between a timer thread and its registry entry. Exactly one of
/// `cancel` and `wait` moves the phase out of `Pending`, and the
/// deadline decides which: before it only a cancel can, from it on only
/// the timer thread can.
struct CancelToken {
    deadline: Instant,
    phase: Mutex<Phase>,
    changed: Condvar,
}

impl CancelToken {
    fn new(deadline: Instant) -> Self {
        Self {
            deadline,
            phase: Mutex::new(Phase::Pending),
            changed: Condvar::new(),
        }
    }

    /// Returns true if this call cancelled a pending timer. Once the deadline
    /// has passed the timer is due and cancelling is a no-op.
    fn cancel(&self) -> bool {
        let mut phase = self.phase.lock().expect("timer phase mutex poisoned");
        if *phase != Phase::Pending || Instant::now() >= self.deadline {
            return false;
        }
        *phase = Phase::Cancelled;
        self.changed.notify_all();
        true
    }

    /// Block until the deadline passes or the timer is cancelled.
    /// Returns true if the timer fired.
    fn wait(&self) -> bool {
        let deadline = self.deadline;
        let mut phase = self.phase.lock().expect("timer phase mutex poisoned");
        loop {
            if *phase == Phase::Cancelled {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                *phase = Phase::Fired;
                return true;
            }
            // Spurious wakeups loop back and re-check both conditions.
            let (guard, _) = self
                .changed
                .wait_timeout(phase, deadline - now)
                .expect("timer condvar wait failed");
            phase = guard;
        }
    }
}

struct TimerEntry {
    started: Instant,
    duration: Duration,
    token: Arc<CancelToken>,
}

type TimerTable = Arc<Mutex<HashMap<TimerId, TimerEntry>>>;

/// Registry of live timers. Entries leave the table when they fire or are
/// killed, whichever happens first.
pub struct TimerRegistry {
    timers: TimerTable,
    next_id: AtomicU64,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self {
            timers: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
        }
    }

    /// Schedule `callback` to run once after `duration` on its own thread.
    pub fn start_timer<F>(&self, duration: Duration, callback: F) -> Result<TimerId, LineError>
    where
        F: FnOnce() + Send + 'static,
    {
        let id = TimerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let started = Instant::now();
        let token = Arc::new(CancelToken::new(started + duration));

        self.timers
            .lock()
            .expect("timer table mutex poisoned")
            .insert(
                id,
                TimerEntry {
                    started,
                    duration,
                    token: Arc::clone(&token),
                },
            );

        let timers = Arc::clone(&self.timers);
        let spawned = thread::Builder::new()
            .name(id.to_string())
            .spawn(move || {
                if token.wait() {
                    debug!("{id} fired after {duration:?}");
                    callback();
                }
                // Ids are never reused, so this cannot evict a newer timer.
                timers
                    .lock()
                    .expect("timer table mutex poisoned")
                    .remove(&id);
            });

        if let Err(source) = spawned {
            self.timers
                .lock()
                .expect("timer table mutex poisoned")
                .remove(&id);
            return Err(LineError::spawn(id.to_string(), source));
        }
        debug!("{id} started for {duration:?}");
        Ok(id)
    }

    /// Cancel a pending timer. Unknown and stale handles, and timers whose
    /// delay has already elapsed, are a no-op and return false.
    pub fn kill_timer(&self, id: TimerId) -> bool {
        let mut guard = self.timers.lock().expect("timer table mutex poisoned");
        let cancelled = guard
            .get(&id)
            .map(|entry| entry.token.cancel())
            .unwrap_or(false);
        if cancelled {
            guard.remove(&id);
            debug!("{id} killed");
        }
        cancelled
    }

    /// Whether the handle still refers to a timer in the table.
    #[allow(dead_code)]
    pub fn is_live(&self, id: TimerId) -> bool {
        let guard = self.timers.lock().expect("timer table mutex poisoned");
        guard.contains_key(&id)
    }

    /// Time left before a live timer is due; `None` for unknown handles.
    #[allow(dead_code)]
    pub fn remaining(&self, id: TimerId) -> Option<Duration> {
        let guard = self.timers.lock().expect("timer table mutex poisoned");
        guard
            .get(&id)
            .map(|entry| entry.duration.saturating_sub(entry.started.elapsed()))
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        let guard = self.timers.lock().expect("timer table mutex poisoned");
        guard.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for TimerRegistry {
    fn drop(&mut self) {
        let mut guard = match self.timers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        for entry in guard.values() {
            entry.token.cancel();
        }
        guard.clear();
    }
}
