//! Wiring for the whole line: sensor, coordinator, machines and drivers.

use std::sync::Arc;
use std::time::Duration;

use log::info;

use crate::coordinator::Coordinator;
use crate::drivers::{self, DriverHandle};
use crate::error::LineError;
use crate::pool::{FillTime, FillingPool};
use crate::sensor::Sensor;

/// Filling machines on the production line.
pub const MACHINE_COUNT: usize = 3;
const ARRIVAL_INTERVAL: Duration = Duration::from_secs(2);
const REMOVAL_INTERVAL: Duration = Duration::from_secs(5);

/// Pacing of the simulated outside world and the machines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineTiming {
    pub machines: usize,
    pub arrival_interval: Duration,
    pub removal_interval: Duration,
    pub fill: FillTime,
}

impl Default for LineTiming {
    fn default() -> Self {
        Self {
            machines: MACHINE_COUNT,
            arrival_interval: ARRIVAL_INTERVAL,
            removal_interval: REMOVAL_INTERVAL,
            fill: FillTime::default(),
        }
    }
}

/// A running line.
pub struct Line {
    #[allow(dead_code)]
    pub sensor: Arc<Sensor>,
    pub pool: FillingPool,
    pub arrival: DriverHandle,
    pub removal: DriverHandle,
}

/// Start the machines first so the drivers always have someone to hand off to.
pub fn start_line(timing: LineTiming) -> Result<Line, LineError> {
    let sensor = Arc::new(Sensor::new());
    let coordinator = Arc::new(Coordinator::new(Arc::clone(&sensor)));
    let pool = FillingPool::spawn(timing.machines, coordinator.machine_ports(), timing.fill)?;
    let arrival = drivers::spawn_arrival(Arc::clone(&coordinator), timing.arrival_interval)?;
    let removal = drivers::spawn_removal(coordinator, timing.removal_interval)?;
    info!(
        "line started: machines={} arrival_every={:?} removal_every={:?}",
        pool.size(),
        timing.arrival_interval,
        timing.removal_interval
    );
    Ok(Line {
        sensor,
        pool,
        arrival,
        removal,
    })
}

/// Run the line until the process is killed. Returns only if a driver fails.
pub fn run(timing: LineTiming) -> Result<(), LineError> {
    let line = start_line(timing)?;
    line.arrival.join()?;
    line.removal.join()?;
    line.pool.join();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Instant;

    fn init() {
        env_logger::builder().is_test(true).try_init().ok();
    }

    fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < timeout {
            if done() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        done()
    }

    fn fast_timing() -> LineTiming {
        LineTiming {
            machines: MACHINE_COUNT,
            arrival_interval: Duration::from_millis(5),
            removal_interval: Duration::from_millis(5),
            fill: FillTime::new(Duration::from_millis(5), Duration::from_millis(15)),
        }
    }

    #[test]
    fn default_timing_matches_the_plant() {
        let timing = LineTiming::default();
        assert_eq!(timing.machines, 3);
        assert_eq!(timing.arrival_interval, Duration::from_secs(2));
        assert_eq!(timing.removal_interval, Duration::from_secs(5));
        assert_eq!(timing.fill, FillTime::default());
    }

    #[test]
    fn line_makes_progress_without_deadlock() {
        init();
        let line = start_line(fast_timing()).expect("start line");
        let stats = line.pool.stats();
        assert_eq!(line.pool.size(), MACHINE_COUNT);

        assert!(wait_until(Duration::from_secs(5), || stats.completed() >= 20));
        assert!(stats.filling() <= MACHINE_COUNT);

        line.arrival.stop();
        line.removal.stop();
    }

    #[test]
    fn slow_removal_throttles_the_machines() {
        init();
        let timing = LineTiming {
            removal_interval: Duration::from_millis(50),
            ..fast_timing()
        };
        let started = Instant::now();
        let line = start_line(timing).expect("start line");
        let stats = line.pool.stats();

        // Finished crates wait inside the machines instead of piling onto
        // the full place.
        assert!(wait_until(Duration::from_secs(2), || line.sensor.full_place_occupied()));
        thread::sleep(Duration::from_millis(200));
        let completed = stats.completed();
        let removals = started.elapsed().as_millis() as usize / 50;
        // One priming hand-off plus at most one per removal period.
        assert!(completed <= removals + 1);

        line.arrival.stop();
        line.removal.stop();
    }
}
