//! Microphone capture via CPAL.
//!
//! Handles device selection, format conversion, and buffer assembly. Every
//! supported sample format is normalized to f32 so the tracking side stays
//! format-agnostic.

use super::chunker::FrameChunker;
use super::{BufferSink, CaptureSession, CaptureSource, SignalBuffer};
use crate::error::{Result, TrackerError};
use crate::tracking::LevelMeter;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};
use tracing::{debug, error, info};

/// CPAL-backed capture source.
///
/// Construction is cheap; the device is acquired fresh on every meter probe
/// and session open, so a tracker can be restarted after the hardware set
/// changes.
pub struct DeviceSource {
    preferred_device: Option<String>,
    meter: Option<LevelMeter>,
}

impl DeviceSource {
    /// Source over the host default input, or a specific device when users
    /// need to pick between multiple microphones.
    pub fn new(preferred_device: Option<String>) -> Self {
        Self {
            preferred_device,
            meter: None,
        }
    }

    /// List input device names so a CLI can expose a selector.
    pub fn list_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();
        let devices = host
            .input_devices()
            .map_err(|_| TrackerError::InputUnavailable)?;
        let mut names = Vec::new();
        for device in devices {
            if let Ok(name) = device.name() {
                names.push(name);
            }
        }
        Ok(names)
    }

    fn acquire_device(&self) -> Result<cpal::Device> {
        let host = cpal::default_host();
        match &self.preferred_device {
            Some(name) => {
                let mut devices = host
                    .input_devices()
                    .map_err(|_| TrackerError::InputUnavailable)?;
                devices
                    .find(|d| d.name().map(|n| &n == name).unwrap_or(false))
                    .ok_or_else(|| TrackerError::DeviceNotFound(name.clone()))
            }
            None => host
                .default_input_device()
                .ok_or(TrackerError::InputUnavailable),
        }
    }
}

impl CaptureSource for DeviceSource {
    fn attach_meter(&mut self, meter: &LevelMeter) -> Result<()> {
        let device = self.acquire_device()?;
        device.default_input_config().map_err(|err| {
            TrackerError::ConfigurationFailure(format!("input config unavailable: {err}"))
        })?;
        self.meter = Some(meter.clone());
        Ok(())
    }

    fn open(&mut self, buffer_size: u32, sink: BufferSink) -> Result<Box<dyn CaptureSession>> {
        let device = self.acquire_device()?;
        let default_config = device.default_input_config().map_err(|err| {
            TrackerError::ConfigurationFailure(format!("input config unavailable: {err}"))
        })?;
        let format = default_config.sample_format();
        let device_config: StreamConfig = default_config.into();
        let sample_rate = device_config.sample_rate.0;
        let channels = usize::from(device_config.channels.max(1));
        let device_name = device
            .name()
            .unwrap_or_else(|_| "unknown input device".to_string());

        debug!(
            "opening capture: device='{device_name}' format={format:?} \
             sample_rate={sample_rate}Hz channels={channels}"
        );

        // Meter before the sink sees the buffer, so the level read during
        // evaluation belongs to the buffer being evaluated.
        let meter = self.meter.clone();
        let mut sink = sink;
        let metered: BufferSink = Box::new(move |buffer: SignalBuffer| {
            if let Some(meter) = &meter {
                meter.update(buffer.average_power_db(), buffer.peak_power_db());
            }
            sink(buffer);
        });
        let mut chunker = FrameChunker::new(buffer_size as usize, sample_rate, metered);

        let err_fn = |err| error!("audio stream error: {err}");
        let stream = match format {
            SampleFormat::F32 => device.build_input_stream(
                &device_config,
                move |data: &[f32], _| chunker.push(data, channels, |sample| sample),
                err_fn,
                None,
            ),
            SampleFormat::I16 => device.build_input_stream(
                &device_config,
                move |data: &[i16], _| {
                    chunker.push(data, channels, |sample| sample as f32 / 32_768.0)
                },
                err_fn,
                None,
            ),
            SampleFormat::U16 => device.build_input_stream(
                &device_config,
                move |data: &[u16], _| {
                    chunker.push(data, channels, |sample| {
                        (sample as f32 - 32_768.0) / 32_768.0
                    })
                },
                err_fn,
                None,
            ),
            other => {
                return Err(TrackerError::ConfigurationFailure(format!(
                    "unsupported sample format: {other:?}"
                )))
            }
        }
        .map_err(|err| {
            TrackerError::ConfigurationFailure(format!("failed to open input stream: {err}"))
        })?;

        stream.play().map_err(|err| {
            TrackerError::ConfigurationFailure(format!("failed to start input stream: {err}"))
        })?;
        info!("capture session open on '{device_name}'");

        Ok(Box::new(DeviceSession {
            stream: Some(stream),
        }))
    }
}

struct DeviceSession {
    stream: Option<cpal::Stream>,
}

impl CaptureSession for DeviceSession {
    fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(err) = stream.pause() {
                debug!("failed to pause input stream: {err}");
            }
            drop(stream);
        }
    }
}
