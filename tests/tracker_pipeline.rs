//! Drives the tracker through its public seam with the production serial
//! dispatcher: a scripted capture source feeds buffers, and assertions run
//! after the notification thread has been joined.

use sigtrack::capture::{BufferSink, BufferTimestamp, CaptureSession, CaptureSource, SignalBuffer};
use sigtrack::tracking::LevelMeter;
use sigtrack::{
    InputSignalTracker, Result, SerialDispatcher, SignalTracker, SignalTrackerDelegate,
    TrackerConfig,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[test]
fn gate_verdicts_reach_the_observer_in_buffer_order() {
    let pump = Arc::new(Mutex::new(Pump::default()));
    let dispatcher = Arc::new(SerialDispatcher::new());
    let config = TrackerConfig {
        level_threshold_db: Some(-40.0),
        ..TrackerConfig::default()
    };
    let mut tracker = InputSignalTracker::with_source(
        config,
        Box::new(FeedSource { pump: pump.clone() }),
        dispatcher.clone(),
    );
    let delegate = Arc::new(CountingDelegate::default());
    let observer = Arc::downgrade(&delegate);
    tracker.set_delegate(observer);

    tracker.start().unwrap();
    feed(&pump, Some(-35.0), vec![0.1; 4], 0);
    feed(&pump, Some(-50.0), vec![0.01; 4], 4);
    feed(&pump, Some(-30.0), vec![0.2; 4], 8);
    feed(&pump, None, vec![0.2; 4], 12);
    tracker.stop();

    // Dropping both handles joins the notification thread after it drains
    // the queue, so every queued delivery has happened by the asserts.
    drop(tracker);
    drop(dispatcher);

    let above = delegate.above.lock().unwrap();
    assert_eq!(above.len(), 2);
    assert_eq!(above[0].timestamp.sample_position, 0);
    assert_eq!(above[1].timestamp.sample_position, 8);
    assert_eq!(delegate.below.load(Ordering::SeqCst), 1);
}

#[test]
fn restarted_tracker_keeps_notifying() {
    let pump = Arc::new(Mutex::new(Pump::default()));
    let dispatcher = Arc::new(SerialDispatcher::new());
    let mut tracker = InputSignalTracker::with_source(
        TrackerConfig::default(),
        Box::new(FeedSource { pump: pump.clone() }),
        dispatcher.clone(),
    );
    let delegate = Arc::new(CountingDelegate::default());
    let observer = Arc::downgrade(&delegate);
    tracker.set_delegate(observer);

    tracker.start().unwrap();
    feed(&pump, Some(-20.0), vec![0.1; 4], 0);
    tracker.stop();

    tracker.start().unwrap();
    feed(&pump, Some(-20.0), vec![0.1; 4], 0);
    tracker.stop();

    drop(tracker);
    drop(dispatcher);

    assert_eq!(delegate.above.lock().unwrap().len(), 2);
    assert_eq!(delegate.below.load(Ordering::SeqCst), 0);
}

#[derive(Default)]
struct Pump {
    sink: Option<BufferSink>,
    meter: Option<LevelMeter>,
}

struct FeedSource {
    pump: Arc<Mutex<Pump>>,
}

impl CaptureSource for FeedSource {
    fn attach_meter(&mut self, meter: &LevelMeter) -> Result<()> {
        self.pump.lock().unwrap().meter = Some(meter.clone());
        Ok(())
    }

    fn open(&mut self, _buffer_size: u32, sink: BufferSink) -> Result<Box<dyn CaptureSession>> {
        self.pump.lock().unwrap().sink = Some(sink);
        Ok(Box::new(FeedSession {
            pump: self.pump.clone(),
        }))
    }
}

struct FeedSession {
    pump: Arc<Mutex<Pump>>,
}

impl CaptureSession for FeedSession {
    // Releases the delivery path like the real session dropping its stream.
    fn stop(&mut self) {
        self.pump.lock().unwrap().sink = None;
    }
}

fn feed(pump: &Arc<Mutex<Pump>>, level_db: Option<f32>, samples: Vec<f32>, sample_position: u64) {
    let mut pump = pump.lock().unwrap();
    if let Some(meter) = &pump.meter {
        match level_db {
            Some(db) => meter.update(db, db),
            None => meter.clear(),
        }
    }
    let timestamp = BufferTimestamp {
        sample_position,
        sample_rate: 48_000,
    };
    if let Some(sink) = pump.sink.as_mut() {
        sink(SignalBuffer { samples, timestamp });
    }
}

#[derive(Default)]
struct CountingDelegate {
    above: Mutex<Vec<SignalBuffer>>,
    below: AtomicUsize,
}

impl SignalTrackerDelegate for CountingDelegate {
    fn did_receive_buffer(&self, buffer: SignalBuffer) {
        self.above.lock().unwrap().push(buffer);
    }

    fn went_below_threshold(&self) {
        self.below.fetch_add(1, Ordering::SeqCst);
    }
}
