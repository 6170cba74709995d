//! Unbuffered hand-off slots. A send blocks until a receiver takes the
//! token and vice versa, so exactly one crate is in flight per exchange.

use crossbeam::channel::{Receiver, Sender, bounded};

use crate::error::LineError;
use crate::types::Token;

/// A named rendezvous channel carrying crate tokens.
pub struct Slot {
    name: &'static str,
    tx: Sender<Token>,
    rx: Receiver<Token>,
}

impl Slot {
    /// Create a slot with no capacity; `name` shows up in errors.
    pub fn new(name: &'static str) -> Self {
        let (tx, rx) = bounded(0);
        Self { name, tx, rx }
    }

    /// Block until some receiver takes one token.
    pub fn send(&self) -> Result<(), LineError> {
        self.tx
            .send(Token)
            .map_err(|_| LineError::SlotClosed { slot: self.name })
    }

    /// Block until some sender hands over one token.
    pub fn recv(&self) -> Result<Token, LineError> {
        self.rx
            .recv()
            .map_err(|_| LineError::SlotClosed { slot: self.name })
    }

    /// A sending end for a producer thread.
    pub fn sender(&self) -> Sender<Token> {
        self.tx.clone()
    }

    /// A receiving end for a consumer thread.
    pub fn receiver(&self) -> Receiver<Token> {
        self.rx.clone()
    }
}
