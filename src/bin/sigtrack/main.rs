//! Live microphone gate monitor.
//!
//! Runs an input signal tracker against the default (or named) input device
//! for a fixed duration, printing one line per gate decision and a summary
//! at the end.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use sigtrack::{
    DeviceSource, InputSignalTracker, MeteringPolicy, SignalBuffer, SignalTracker,
    SignalTrackerDelegate, TrackerConfig, DEFAULT_BUFFER_SIZE,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(about = "Microphone level gate monitor", author, version)]
struct Args {
    /// Print detected audio input devices and exit
    #[arg(long = "list-input-devices", default_value_t = false)]
    list_input_devices: bool,

    /// Preferred audio input device name
    #[arg(long)]
    input_device: Option<String>,

    /// Frames per delivered buffer
    #[arg(long, default_value_t = DEFAULT_BUFFER_SIZE)]
    buffer_size: u32,

    /// Gate threshold in dBFS; omit to report every buffer as signal
    #[arg(long)]
    level_threshold_db: Option<f32>,

    /// How to treat level-metering setup failures
    #[arg(long, value_enum, default_value_t = MeteringPolicy::BestEffort)]
    metering: MeteringPolicy,

    /// How long to monitor before exiting, in seconds
    #[arg(long, default_value_t = 5)]
    seconds: u64,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

struct ConsoleDelegate {
    above: AtomicUsize,
    below: AtomicUsize,
}

impl SignalTrackerDelegate for ConsoleDelegate {
    fn did_receive_buffer(&self, buffer: SignalBuffer) {
        self.above.fetch_add(1, Ordering::Relaxed);
        println!(
            "[{:7.3}s] signal  avg {:6.1} dBFS  peak {:6.1} dBFS",
            buffer.timestamp.as_duration().as_secs_f64(),
            buffer.average_power_db(),
            buffer.peak_power_db(),
        );
    }

    fn went_below_threshold(&self) {
        self.below.fetch_add(1, Ordering::Relaxed);
        println!("           quiet");
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with_writer(std::io::stderr)
        .init();

    if args.list_input_devices {
        let devices = DeviceSource::list_devices().context("could not enumerate input devices")?;
        if devices.is_empty() {
            println!("no input devices detected");
        } else {
            for name in devices {
                println!("{name}");
            }
        }
        return Ok(());
    }

    let config = TrackerConfig {
        buffer_size: args.buffer_size,
        level_threshold_db: args.level_threshold_db,
        input_device: args.input_device,
        metering: args.metering,
    };

    let delegate = Arc::new(ConsoleDelegate {
        above: AtomicUsize::new(0),
        below: AtomicUsize::new(0),
    });
    let mut tracker = InputSignalTracker::new(config);
    let observer = Arc::downgrade(&delegate);
    tracker.set_delegate(observer);

    tracker.start().context("failed to start signal tracking")?;
    match args.level_threshold_db {
        Some(db) => println!("monitoring for {}s (threshold {db} dBFS)...", args.seconds),
        None => println!("monitoring for {}s (no threshold)...", args.seconds),
    }

    std::thread::sleep(Duration::from_secs(args.seconds));

    let peak = tracker.peak_level();
    tracker.stop();
    // Dropping the tracker joins its notification thread, so the counters
    // are final once this returns.
    drop(tracker);

    let above = delegate.above.load(Ordering::Relaxed);
    let below = delegate.below.load(Ordering::Relaxed);
    println!("done: {above} buffers with signal, {below} quiet");
    match peak {
        Some(db) => println!("session peak: {db:.1} dBFS"),
        None => println!("session peak: unavailable"),
    }

    Ok(())
}
