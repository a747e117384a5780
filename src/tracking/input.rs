use super::dispatch::{Dispatcher, SerialDispatcher};
use super::gate::{GateDecision, LevelGate};
use super::meter::LevelMeter;
use super::tracker::{DelegateSlot, SignalTracker, SignalTrackerDelegate, TrackerState};
use crate::capture::{BufferSink, CaptureSession, CaptureSource, DeviceSource, SignalBuffer};
use crate::config::{MeteringPolicy, TrackerConfig};
use crate::error::{Result, TrackerError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{info, warn};

/// Signal tracker over a live microphone input.
///
/// Owns the capture session lifecycle and evaluates every delivered buffer
/// against the gate. Decisions are queued on the notification context, so
/// observer work never runs on the audio callback. The tracker is restartable
/// and holds no capture resource while `Idle`.
pub struct InputSignalTracker {
    config: TrackerConfig,
    source: Box<dyn CaptureSource>,
    meter: LevelMeter,
    gate: LevelGate,
    delegate: DelegateSlot,
    dispatcher: Arc<dyn Dispatcher>,
    hooked: Arc<AtomicBool>,
    session: Option<Box<dyn CaptureSession>>,
    state: TrackerState,
}

impl InputSignalTracker {
    /// Tracker over the configured input device with its own notification
    /// thread.
    pub fn new(config: TrackerConfig) -> Self {
        let source = Box::new(DeviceSource::new(config.input_device.clone()));
        Self::with_source(config, source, Arc::new(SerialDispatcher::new()))
    }

    /// Tracker over a caller-supplied capture source and dispatcher. This is
    /// the seam for alternate providers and for deterministic tests.
    pub fn with_source(
        config: TrackerConfig,
        source: Box<dyn CaptureSource>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Self {
        let gate = LevelGate::new(config.level_threshold_db);
        Self {
            config,
            source,
            meter: LevelMeter::new(),
            gate,
            delegate: DelegateSlot::new(),
            dispatcher,
            hooked: Arc::new(AtomicBool::new(false)),
            session: None,
            state: TrackerState::Idle,
        }
    }

    /// Per-buffer callback handed to the capture source.
    ///
    /// Runs on the audio callback context: it only reads atomics and queues
    /// a task, the observer itself is resolved later on the notification
    /// context so a swap or drop between decision and delivery is honored.
    fn buffer_sink(&self) -> BufferSink {
        let hooked = Arc::clone(&self.hooked);
        let meter = self.meter.clone();
        let gate = self.gate.clone();
        let delegate = self.delegate.clone();
        let dispatcher = Arc::clone(&self.dispatcher);
        Box::new(move |buffer: SignalBuffer| {
            if !hooked.load(Ordering::Acquire) {
                return;
            }
            // No level reading means this buffer cannot be judged; skip it
            // without notifying either way.
            let average = match meter.average_db() {
                Some(db) => db,
                None => return,
            };
            match gate.evaluate(average) {
                GateDecision::AboveThreshold => {
                    let delegate = delegate.clone();
                    dispatcher.dispatch(Box::new(move || {
                        if let Some(observer) = delegate.current() {
                            observer.did_receive_buffer(buffer);
                        }
                    }));
                }
                GateDecision::BelowThreshold => {
                    let delegate = delegate.clone();
                    dispatcher.dispatch(Box::new(move || {
                        if let Some(observer) = delegate.current() {
                            observer.went_below_threshold();
                        }
                    }));
                }
            }
        })
    }
}

impl SignalTracker for InputSignalTracker {
    fn start(&mut self) -> Result<()> {
        if self.state == TrackerState::Running {
            return Err(TrackerError::AlreadyRunning);
        }

        if let Err(err) = self.source.attach_meter(&self.meter) {
            match self.config.metering {
                MeteringPolicy::Required => return Err(err),
                MeteringPolicy::BestEffort => {
                    warn!("level metering unavailable, continuing without it: {err}");
                }
            }
        }

        self.hooked.store(true, Ordering::Release);
        let sink = self.buffer_sink();
        match self.source.open(self.config.buffer_size, sink) {
            Ok(session) => {
                self.session = Some(session);
                self.state = TrackerState::Running;
                info!(
                    "signal tracking started: buffer_size={} threshold={:?} metering={}",
                    self.config.buffer_size,
                    self.gate.get(),
                    self.config.metering.label()
                );
                Ok(())
            }
            Err(err) => {
                self.hooked.store(false, Ordering::Release);
                self.meter.clear();
                Err(err)
            }
        }
    }

    fn stop(&mut self) {
        // Unhook before teardown so no buffer evaluated from here on can
        // queue a notification.
        self.hooked.store(false, Ordering::Release);
        if let Some(mut session) = self.session.take() {
            session.stop();
            info!("signal tracking stopped");
        }
        // Cleared even when never started, matching the rest of the
        // best-effort teardown.
        self.meter.clear();
        self.state = TrackerState::Idle;
    }

    fn state(&self) -> TrackerState {
        self.state
    }

    fn peak_level(&self) -> Option<f32> {
        self.meter.peak_db()
    }

    fn average_level(&self) -> Option<f32> {
        self.meter.average_db()
    }

    fn level_threshold(&self) -> Option<f32> {
        self.gate.get()
    }

    fn set_level_threshold(&self, threshold_db: Option<f32>) {
        self.gate.set(threshold_db);
    }

    fn set_delegate(&self, delegate: Weak<dyn SignalTrackerDelegate>) {
        self.delegate.set(delegate);
    }

    fn clear_delegate(&self) {
        self.delegate.clear();
    }
}

impl Drop for InputSignalTracker {
    fn drop(&mut self) {
        self.stop();
    }
}
