use crate::capture::SignalBuffer;
use crate::error::Result;
use crate::lock_or_recover;
use std::sync::{Arc, Mutex, Weak};

/// Lifecycle of a tracking session.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TrackerState {
    Idle,
    Running,
}

/// Capability contract for signal tracker variants.
///
/// A tracker turns a stream of captured audio buffers into one of two
/// observer notifications per buffer by comparing the buffer's average power
/// level against an optional threshold. Lifecycle calls are expected to come
/// from a single control thread; level and threshold accessors may be called
/// from anywhere.
pub trait SignalTracker {
    /// Begin producing buffers. Fails with
    /// [`TrackerError::InputUnavailable`](crate::TrackerError::InputUnavailable)
    /// when no input resource can be acquired, leaving the tracker `Idle`.
    /// May block while hardware is acquired.
    fn start(&mut self) -> Result<()>;

    /// Stop producing buffers and release capture resources. A no-op when
    /// already stopped. Notifications already queued for delivery may still
    /// arrive after this returns; no new ones are produced.
    fn stop(&mut self);

    fn state(&self) -> TrackerState;

    /// Highest level seen this session in dBFS, `None` while not running.
    fn peak_level(&self) -> Option<f32>;

    /// Latest buffer's average level in dBFS, `None` while not running.
    fn average_level(&self) -> Option<f32>;

    fn level_threshold(&self) -> Option<f32>;

    /// Change the gate threshold. Takes effect on the next evaluated buffer;
    /// `None` means every measured buffer counts as signal. A `NaN`
    /// threshold never orders against a level and is stored as `None`.
    fn set_level_threshold(&self, threshold_db: Option<f32>);

    /// Register the observer. The tracker keeps only a weak reference; a
    /// dropped observer turns deliveries into no-ops. Replacing the observer
    /// mid-session takes effect on the next delivered notification.
    fn set_delegate(&self, delegate: Weak<dyn SignalTrackerDelegate>);

    fn clear_delegate(&self);
}

/// Observer notified for every evaluated buffer.
///
/// Both methods run on the tracker's notification context, never on the
/// audio callback. Delivery is fire-and-forget: the tracker does not wait
/// for one notification to finish before queueing the next.
pub trait SignalTrackerDelegate: Send + Sync {
    /// The buffer's average level was above the threshold (or no threshold
    /// is set). Carries the buffer and its capture timestamp.
    fn did_receive_buffer(&self, buffer: SignalBuffer);

    /// The buffer's average level was at or below the threshold.
    fn went_below_threshold(&self);
}

/// Single observer slot shared with the notification context.
///
/// Holds a weak reference so the tracker never extends the observer's
/// lifetime; the upgrade happens at delivery time.
#[derive(Clone)]
pub(crate) struct DelegateSlot {
    inner: Arc<Mutex<Option<Weak<dyn SignalTrackerDelegate>>>>,
}

impl DelegateSlot {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(None)),
        }
    }

    pub(crate) fn set(&self, delegate: Weak<dyn SignalTrackerDelegate>) {
        *lock_or_recover(&self.inner, "delegate slot") = Some(delegate);
    }

    pub(crate) fn clear(&self) {
        *lock_or_recover(&self.inner, "delegate slot") = None;
    }

    /// Upgrade the registered observer if it is still alive.
    pub(crate) fn current(&self) -> Option<Arc<dyn SignalTrackerDelegate>> {
        lock_or_recover(&self.inner, "delegate slot")
            .as_ref()
            .and_then(Weak::upgrade)
    }
}
