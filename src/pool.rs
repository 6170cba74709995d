//! Pool of filling machines. Each machine takes a crate of empty bottles,
//! fills it for a random time, and hands the full crate back.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};
use rand::Rng;

use crate::coordinator::MachinePorts;
use crate::error::LineError;
use crate::types::{MachineId, Token};

/// Inclusive range a single fill may take.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FillTime {
    min: Duration,
    max: Duration,
}

impl FillTime {
    /// Bounds are swapped if given in the wrong order.
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    #[allow(dead_code)]
    pub fn max(&self) -> Duration {
        self.max
    }

    /// Uniform draw in whole milliseconds.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        Duration::from_millis(rng.gen_range(min..=max))
    }
}

impl Default for FillTime {
    fn default() -> Self {
        Self::new(Duration::from_secs(2), Duration::from_secs(6))
    }
}

/// Live counters shared by all machines of a pool.
#[allow(dead_code)]
pub struct PoolStats {
    filling: AtomicUsize,
    completed: Vec<AtomicUsize>,
}

#[allow(dead_code)]
impl PoolStats {
    fn new(machines: usize) -> Self {
        Self {
            filling: AtomicUsize::new(0),
            completed: (0..machines).map(|_| AtomicUsize::new(0)).collect(),
        }
    }

    /// Machines currently inside their fill delay.
    pub fn filling(&self) -> usize {
        self.filling.load(Ordering::SeqCst)
    }

    /// Full crates handed back across the whole pool.
    pub fn completed(&self) -> usize {
        self.completed
            .iter()
            .map(|count| count.load(Ordering::SeqCst))
            .sum()
    }

    pub fn completed_by(&self, machine: MachineId) -> usize {
        self.completed
            .get(machine)
            .map(|count| count.load(Ordering::SeqCst))
            .unwrap_or(0)
    }
}

pub struct FillingPool {
    handles: Vec<thread::JoinHandle<()>>,
    stats: Arc<PoolStats>,
}

impl FillingPool {
    /// Start `machines` independent filling machines on `ports`.
    pub fn spawn(machines: usize, ports: MachinePorts, fill: FillTime) -> Result<Self, LineError> {
        let stats = Arc::new(PoolStats::new(machines));
        let mut handles = Vec::with_capacity(machines);
        for machine in 0..machines {
            let ports = ports.clone();
            let stats = Arc::clone(&stats);
            let name = format!("machine-{machine}");
            let handle = thread::Builder::new()
                .name(name.clone())
                .spawn(move || run_machine(machine, ports, fill, &stats))
                .map_err(|source| LineError::spawn(name, source))?;
            handles.push(handle);
        }
        Ok(Self { handles, stats })
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    #[allow(dead_code)]
    pub fn stats(&self) -> Arc<PoolStats> {
        Arc::clone(&self.stats)
    }

    /// Wait for every machine to stop. Machines stop only once their slots
    /// are disconnected.
    pub fn join(self) {
        for handle in self.handles {
            if handle.join().is_err() {
                warn!("filling machine panicked");
            }
        }
    }
}

fn run_machine(machine: MachineId, ports: MachinePorts, fill: FillTime, stats: &PoolStats) {
    let mut rng = rand::thread_rng();
    loop {
        debug!("Machine {machine}: waiting for empty bottles");
        if ports.empty.recv().is_err() {
            debug!("Machine {machine}: empty-bottle slot closed, stopping");
            return;
        }
        info!("Machine {machine}: receives empty bottles");
        info!("Machine {machine}: starts filling bottles");
        stats.filling.fetch_add(1, Ordering::SeqCst);
        thread::sleep(fill.sample(&mut rng));
        stats.filling.fetch_sub(1, Ordering::SeqCst);
        info!("Machine {machine}: finished filling bottles");

        if ports.full.send(Token).is_err() {
            warn!("Machine {machine}: full-bottle slot closed, dropping filled crate");
            return;
        }
        stats.completed[machine].fetch_add(1, Ordering::SeqCst);
        info!("Machine {machine}: has placed full bottles");
    }
}
