//! Machine coordinator: turns place-sensor changes into hand-offs with the
//! filling machines.

use std::sync::Arc;

use crossbeam::channel::{Receiver, Sender};
use log::{debug, info};

use crate::error::LineError;
use crate::handoff::Slot;
use crate::sensor::Sensor;
use crate::types::Token;

/// Channel ends handed to the filling machines.
#[derive(Clone)]
pub struct MachinePorts {
    pub empty: Receiver<Token>,
    pub full: Sender<Token>,
}

/// Owns the empty-bottle and full-bottle slots and reacts to the sensor.
pub struct Coordinator {
    sensor: Arc<Sensor>,
    empty_slot: Slot,
    full_slot: Slot,
}

impl Coordinator {
    /// Create a coordinator with fresh slots on a shared sensor.
    pub fn new(sensor: Arc<Sensor>) -> Self {
        Self {
            sensor,
            empty_slot: Slot::new("empty-bottle"),
            full_slot: Slot::new("full-bottle"),
        }
    }

    /// The sensor this coordinator watches.
    pub fn sensor(&self) -> &Arc<Sensor> {
        &self.sensor
    }

    /// Fresh channel ends for one or more filling machines.
    pub fn machine_ports(&self) -> MachinePorts {
        MachinePorts {
            empty: self.empty_slot.receiver(),
            full: self.full_slot.sender(),
        }
    }

    /// Pass a waiting crate of empty bottles to a machine.
    ///
    /// No-op unless the empty place is occupied. Otherwise blocks until a
    /// machine accepts the crate, then frees the empty place.
    pub fn on_empty_place_sensor_changed(&self) -> Result<(), LineError> {
        if !self.sensor.empty_place_occupied() {
            debug!("empty place already clear, ignoring notification");
            return Ok(());
        }
        info!("New empty bottles arrived, sending to machines");
        self.empty_slot.send()?;
        info!("Empty bottles sent to machines");
        self.sensor.set_empty_place_occupied(false);
        Ok(())
    }

    /// Fill the full place with the next finished crate.
    ///
    /// No-op while the full place is occupied. Otherwise blocks until a
    /// machine hands over a full crate, then marks the place occupied.
    pub fn on_full_place_sensor_changed(&self) -> Result<(), LineError> {
        if self.sensor.full_place_occupied() {
            debug!("full place still occupied, ignoring notification");
            return Ok(());
        }
        info!("Full bottles removed, take full bottles from machines");
        self.full_slot.recv()?;
        info!("Full bottles taken from one and placed in the full place");
        self.sensor.set_full_place_occupied(true);
        Ok(())
    }
}
