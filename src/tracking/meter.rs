use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

// Quiet-NaN bit pattern marking a cell as unset. Real level readings are
// always finite, so the pattern never collides with a measurement.
const UNSET_BITS: u32 = 0x7fc0_0000;

const MIN_AMPLITUDE: f32 = 1e-6;

/// Shared average/peak level state in dBFS.
///
/// The capture callback writes, any thread reads. Both cells start unset and
/// return to unset on `clear`, so readers see `None` outside a session.
#[derive(Clone, Debug)]
pub struct LevelMeter {
    average_bits: Arc<AtomicU32>,
    peak_bits: Arc<AtomicU32>,
}

impl LevelMeter {
    pub fn new() -> Self {
        Self {
            average_bits: Arc::new(AtomicU32::new(UNSET_BITS)),
            peak_bits: Arc::new(AtomicU32::new(UNSET_BITS)),
        }
    }

    /// Record the latest buffer's levels. The peak cell holds the maximum
    /// seen since the last `clear`.
    pub fn update(&self, average_db: f32, peak_db: f32) {
        self.average_bits
            .store(average_db.to_bits(), Ordering::Relaxed);
        let held = decode(self.peak_bits.load(Ordering::Relaxed));
        if held.map_or(true, |db| peak_db > db) {
            self.peak_bits.store(peak_db.to_bits(), Ordering::Relaxed);
        }
    }

    pub fn clear(&self) {
        self.average_bits.store(UNSET_BITS, Ordering::Relaxed);
        self.peak_bits.store(UNSET_BITS, Ordering::Relaxed);
    }

    pub fn average_db(&self) -> Option<f32> {
        decode(self.average_bits.load(Ordering::Relaxed))
    }

    pub fn peak_db(&self) -> Option<f32> {
        decode(self.peak_bits.load(Ordering::Relaxed))
    }
}

impl Default for LevelMeter {
    fn default() -> Self {
        Self::new()
    }
}

fn decode(bits: u32) -> Option<f32> {
    if bits == UNSET_BITS {
        None
    } else {
        Some(f32::from_bits(bits))
    }
}

pub(crate) fn rms_db(samples: &[f32]) -> f32 {
    let energy: f32 = samples.iter().map(|s| s * s).sum::<f32>() / samples.len().max(1) as f32;
    let rms = energy.sqrt().max(MIN_AMPLITUDE);
    20.0 * rms.log10()
}

pub(crate) fn peak_db(samples: &[f32]) -> f32 {
    let peak = samples
        .iter()
        .map(|s| s.abs())
        .fold(0.0f32, f32::max)
        .max(MIN_AMPLITUDE);
    20.0 * peak.log10()
}
