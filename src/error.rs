//! Failure modes of the line's plumbing.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LineError {
    /// The other side of a hand-off slot is gone.
    #[error("{slot} slot disconnected")]
    SlotClosed { slot: &'static str },
    /// The OS refused to start a named thread.
    #[error("failed to spawn {name} thread")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },
}

impl LineError {
    pub(crate) fn spawn(name: impl Into<String>, source: io::Error) -> Self {
        Self::Spawn {
            name: name.into(),
            source,
        }
    }
}
