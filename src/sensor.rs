//! Occupancy sensors for the empty and full places, plus the timer facility
//! the control system exposes next to them.

use std::sync::Mutex;
use std::time::Duration;

use crate::error::LineError;
use crate::timer::TimerRegistry;
use crate::types::TimerId;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Places {
    empty_occupied: bool,
    full_occupied: bool,
}

/// The lock is held only for a single read or write, never across a
/// hand-off, so a blocked coordinator cannot stall the drivers' reads.
pub struct Sensor {
    places: Mutex<Places>,
    timers: TimerRegistry,
}

impl Sensor {
    /// Both places start unoccupied.
    pub fn new() -> Self {
        Self {
            places: Mutex::new(Places::default()),
            timers: TimerRegistry::new(),
        }
    }

    /// Mark whether a crate of empty bottles waits for pickup.
    pub fn set_empty_place_occupied(&self, occupied: bool) {
        let mut guard = self.places.lock().expect("sensor mutex poisoned");
        guard.empty_occupied = occupied;
    }

    /// Whether a crate of empty bottles waits for pickup.
    pub fn empty_place_occupied(&self) -> bool {
        let guard = self.places.lock().expect("sensor mutex poisoned");
        guard.empty_occupied
    }

    /// Mark whether a crate of full bottles waits for removal.
    pub fn set_full_place_occupied(&self, occupied: bool) {
        let mut guard = self.places.lock().expect("sensor mutex poisoned");
        guard.full_occupied = occupied;
    }

    /// Whether a crate of full bottles waits for removal.
    pub fn full_place_occupied(&self) -> bool {
        let guard = self.places.lock().expect("sensor mutex poisoned");
        guard.full_occupied
    }

    /// Occupy the empty place if it is free. Returns true on a transition.
    pub fn try_occupy_empty_place(&self) -> bool {
        let mut guard = self.places.lock().expect("sensor mutex poisoned");
        if guard.empty_occupied {
            return false;
        }
        guard.empty_occupied = true;
        true
    }

    /// Clear the full place if it holds a crate. Returns true on a transition.
    pub fn try_clear_full_place(&self) -> bool {
        let mut guard = self.places.lock().expect("sensor mutex poisoned");
        if !guard.full_occupied {
            return false;
        }
        guard.full_occupied = false;
        true
    }

    /// Run `callback` once after `duration` unless killed first.
    #[allow(dead_code)]
    pub fn start_timer<F>(&self, duration: Duration, callback: F) -> Result<TimerId, LineError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.timers.start_timer(duration, callback)
    }

    /// Cancel a pending timer; see [`TimerRegistry::kill_timer`].
    #[allow(dead_code)]
    pub fn kill_timer(&self, id: TimerId) -> bool {
        self.timers.kill_timer(id)
    }

    #[allow(dead_code)]
    pub fn timers(&self) -> &TimerRegistry {
        &self.timers
    }
}
