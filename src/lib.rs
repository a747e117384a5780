pub mod capture;
pub mod config;
pub mod error;
mod lock;
pub mod tracking;

pub(crate) use lock::lock_or_recover;

pub use capture::{BufferTimestamp, DeviceSource, SignalBuffer};
pub use config::{MeteringPolicy, TrackerConfig, DEFAULT_BUFFER_SIZE};
pub use error::{Result, TrackerError};
pub use tracking::{
    InputSignalTracker, SerialDispatcher, SignalTracker, SignalTrackerDelegate, TrackerState,
};
