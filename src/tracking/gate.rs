use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

// Quiet-NaN bit pattern for "no threshold configured".
const UNSET_BITS: u32 = 0x7fc0_0000;

/// Outcome of evaluating one buffer's average level against the threshold.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum GateDecision {
    AboveThreshold,
    BelowThreshold,
}

/// Optional dB threshold shared between the control thread and the capture
/// callback.
///
/// An unset threshold means every measured buffer counts as signal. A set
/// threshold passes only levels strictly above it, so a buffer sitting
/// exactly on the threshold reads as quiet. A `NaN` threshold is stored as
/// unset.
#[derive(Clone, Debug)]
pub(crate) struct LevelGate {
    threshold_bits: Arc<AtomicU32>,
}

impl LevelGate {
    pub(crate) fn new(threshold_db: Option<f32>) -> Self {
        let gate = Self {
            threshold_bits: Arc::new(AtomicU32::new(UNSET_BITS)),
        };
        gate.set(threshold_db);
        gate
    }

    pub(crate) fn set(&self, threshold_db: Option<f32>) {
        let bits = match threshold_db {
            // NaN never orders against a level, and the canonical NaN is
            // the unset marker itself; store any NaN as no threshold.
            Some(db) if db.is_nan() => UNSET_BITS,
            Some(db) => db.to_bits(),
            None => UNSET_BITS,
        };
        self.threshold_bits.store(bits, Ordering::Relaxed);
    }

    pub(crate) fn get(&self) -> Option<f32> {
        let bits = self.threshold_bits.load(Ordering::Relaxed);
        if bits == UNSET_BITS {
            None
        } else {
            Some(f32::from_bits(bits))
        }
    }

    pub(crate) fn evaluate(&self, average_db: f32) -> GateDecision {
        match self.get() {
            None => GateDecision::AboveThreshold,
            Some(threshold) if average_db > threshold => GateDecision::AboveThreshold,
            Some(_) => GateDecision::BelowThreshold,
        }
    }
}
