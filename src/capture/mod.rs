//! Audio capture provider seam.
//!
//! A [`CaptureSource`] turns the microphone into a stream of fixed-size mono
//! buffers pushed into a [`BufferSink`], and wires the shared level meter so
//! the tracker can read average and peak power while the session runs. The
//! production source is CPAL-backed ([`DeviceSource`]); anything that honors
//! the trait contract can stand in for it.

mod chunker;
mod device;

pub use device::DeviceSource;

use crate::error::Result;
use crate::tracking::LevelMeter;
use std::time::Duration;

/// Callback invoked with each completed buffer, on the capture context.
pub type BufferSink = Box<dyn FnMut(SignalBuffer) + Send>;

/// Provider of live audio input.
pub trait CaptureSource {
    /// One-time wiring of level metering for the upcoming session. The
    /// source keeps the meter updated with each buffer's average and peak
    /// while a session is open. Fails when the input device or its
    /// configuration cannot be probed.
    fn attach_meter(&mut self, meter: &LevelMeter) -> Result<()>;

    /// Acquire the input and begin delivering `buffer_size`-frame buffers
    /// into `sink` until the returned session is stopped.
    fn open(&mut self, buffer_size: u32, sink: BufferSink) -> Result<Box<dyn CaptureSession>>;
}

/// A running capture stream. Dropped or stopped on the control thread; the
/// underlying stream handle is not required to be `Send`.
pub trait CaptureSession {
    fn stop(&mut self);
}

/// Fixed-size chunk of mono samples plus its capture timestamp.
#[derive(Clone, Debug)]
pub struct SignalBuffer {
    pub samples: Vec<f32>,
    pub timestamp: BufferTimestamp,
}

impl SignalBuffer {
    /// Average power of this buffer in dBFS.
    pub fn average_power_db(&self) -> f32 {
        crate::tracking::rms_db(&self.samples)
    }

    /// Largest sample magnitude in this buffer in dBFS.
    pub fn peak_power_db(&self) -> f32 {
        crate::tracking::peak_db(&self.samples)
    }
}

/// Position of a buffer's first frame within the capture session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferTimestamp {
    /// Frames captured before this buffer began.
    pub sample_position: u64,
    /// Device sample rate the position counts against.
    pub sample_rate: u32,
}

impl BufferTimestamp {
    /// Offset of this buffer from the session start.
    pub fn as_duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.sample_position as f64 / f64::from(self.sample_rate))
    }
}
