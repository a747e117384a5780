//! Error taxonomy for signal tracking.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TrackerError>;

/// Failures surfaced by the tracker lifecycle.
///
/// Per-buffer evaluation never raises; a buffer without a level reading is
/// skipped rather than reported.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// No capture input resource could be acquired at `start()` time.
    #[error("no audio input device available")]
    InputUnavailable,

    /// A specific input device was requested but is not present.
    #[error("input device '{0}' not found")]
    DeviceNotFound(String),

    /// Device or stream wiring failed after the input was acquired.
    #[error("audio capture configuration failed: {0}")]
    ConfigurationFailure(String),

    /// `start()` was called on a tracker that is already running.
    #[error("signal tracker is already running")]
    AlreadyRunning,
}
