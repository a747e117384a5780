//! Signal tracking engine.
//!
//! Buffers arrive from a capture source, each one is judged against the
//! optional level threshold, and the verdict is delivered to the registered
//! observer on a dedicated notification context.

mod dispatch;
mod gate;
mod input;
mod meter;
mod tracker;

pub use dispatch::{Dispatcher, InlineDispatcher, SerialDispatcher, Task};
pub use input::InputSignalTracker;
pub use meter::LevelMeter;
pub use tracker::{SignalTracker, SignalTrackerDelegate, TrackerState};

pub(crate) use meter::{peak_db, rms_db};
