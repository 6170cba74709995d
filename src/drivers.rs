//! Periodic stand-ins for the outside world: a supplier dropping crates of
//! empty bottles and a forklift taking full crates away.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use log::{debug, info};

use crate::coordinator::Coordinator;
use crate::error::LineError;

/// A running driver thread.
pub struct DriverHandle {
    stop_flag: Arc<AtomicBool>,
    handle: thread::JoinHandle<Result<(), LineError>>,
}

impl DriverHandle {
    /// Ask the driver to leave its loop at the next period boundary. A
    /// driver parked inside a hand-off stays there until its peer shows up.
    #[allow(dead_code)]
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    #[allow(dead_code)]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn join(self) -> Result<(), LineError> {
        match self.handle.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

fn spawn_driver<F>(name: &str, body: F) -> Result<DriverHandle, LineError>
where
    F: FnOnce(&AtomicBool) -> Result<(), LineError> + Send + 'static,
{
    let stop_flag = Arc::new(AtomicBool::new(false));
    let thread_flag = Arc::clone(&stop_flag);
    let handle = thread::Builder::new()
        .name(name.to_string())
        .spawn(move || body(&thread_flag))
        .map_err(|source| LineError::spawn(name, source))?;
    Ok(DriverHandle { stop_flag, handle })
}

/// Every `interval`, drop a crate of empty bottles if the empty place is free
/// and notify the coordinator. Blocks while no machine is idle.
pub fn spawn_arrival(
    coordinator: Arc<Coordinator>,
    interval: Duration,
) -> Result<DriverHandle, LineError> {
    spawn_driver("arrival", move |stop_flag| {
        loop {
            thread::sleep(interval);
            if stop_flag.load(Ordering::SeqCst) {
                break;
            }
            if coordinator.sensor().try_occupy_empty_place() {
                info!("Empty bottles delivered");
                coordinator.on_empty_place_sensor_changed()?;
            }
        }
        debug!("arrival driver stopped");
        Ok(())
    })
}

/// Prime the full place once, then every `interval` take away a full crate
/// if there is one and notify the coordinator.
pub fn spawn_removal(
    coordinator: Arc<Coordinator>,
    interval: Duration,
) -> Result<DriverHandle, LineError> {
    spawn_driver("removal", move |stop_flag| {
        // The full place starts empty, so wait for the first finished crate.
        coordinator.on_full_place_sensor_changed()?;
        loop {
            thread::sleep(interval);
            if stop_flag.load(Ordering::SeqCst) {
                break;
            }
            if coordinator.sensor().try_clear_full_place() {
                info!("Full bottles removed from the full place");
                coordinator.on_full_place_sensor_changed()?;
            }
        }
        debug!("removal driver stopped");
        Ok(())
    })
}
