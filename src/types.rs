//! Shared identifiers and the unit of work moved between places.

use std::fmt;

/// Index of a filling machine within the pool.
pub type MachineId = usize;

/// One crate of bottles crossing a hand-off. Carries no data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Token;

/// Handle for one scheduled delayed callback.
///
/// Issued from a monotonic counter, so a handle is never reused for the
/// lifetime of the registry that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub(crate) u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}
