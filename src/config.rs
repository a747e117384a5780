//! Tracker configuration.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Frames per delivered buffer when the caller does not choose one.
pub const DEFAULT_BUFFER_SIZE: u32 = 2048;

/// Construction-time settings for an input signal tracker.
///
/// `buffer_size` is fixed for the tracker's lifetime; the threshold can also
/// be changed later through the tracker itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Frames per delivered buffer.
    pub buffer_size: u32,
    /// Initial gate threshold in dBFS. `None` treats every buffer as signal.
    pub level_threshold_db: Option<f32>,
    /// Capture from a named input device instead of the host default.
    pub input_device: Option<String>,
    /// How `start()` treats a failure to wire up level metering.
    pub metering: MeteringPolicy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            level_threshold_db: None,
            input_device: None,
            metering: MeteringPolicy::default(),
        }
    }
}

/// Whether level metering is allowed to fail at `start()`.
///
/// `BestEffort` logs the failure and runs without level readings, which also
/// suppresses every gate notification until metering recovers on a later
/// start. `Required` turns the failure into a `start()` error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MeteringPolicy {
    BestEffort,
    Required,
}

impl MeteringPolicy {
    pub fn label(&self) -> &'static str {
        match self {
            MeteringPolicy::BestEffort => "best-effort",
            MeteringPolicy::Required => "required",
        }
    }
}

impl Default for MeteringPolicy {
    fn default() -> Self {
        MeteringPolicy::BestEffort
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = TrackerConfig::default();
        assert_eq!(config.buffer_size, 2048);
        assert_eq!(config.level_threshold_db, None);
        assert_eq!(config.input_device, None);
        assert_eq!(config.metering, MeteringPolicy::BestEffort);
    }

    #[test]
    fn metering_policy_labels() {
        assert_eq!(MeteringPolicy::BestEffort.label(), "best-effort");
        assert_eq!(MeteringPolicy::Required.label(), "required");
    }

    #[test]
    fn partial_document_fills_in_defaults() {
        let config: TrackerConfig =
            serde_json::from_str(r#"{"level_threshold_db": -40.0}"#).unwrap();
        assert_eq!(config.buffer_size, 2048);
        assert_eq!(config.level_threshold_db, Some(-40.0));
        assert_eq!(config.input_device, None);
        assert_eq!(config.metering, MeteringPolicy::BestEffort);
    }

    #[test]
    fn metering_policy_uses_kebab_case_names() {
        let config: TrackerConfig = serde_json::from_str(r#"{"metering": "required"}"#).unwrap();
        assert_eq!(config.metering, MeteringPolicy::Required);
    }
}
