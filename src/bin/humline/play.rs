//! Live playback with a small text meter.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};

use humline::graph::Telemetry;
use humline::{LiveEngine, ParameterSet};

/// Meter refresh interval
const REPORT_INTERVAL: Duration = Duration::from_millis(500);

pub fn run(params: ParameterSet, seconds: f32, seed: Option<u64>) -> EyreResult<()> {
    let length = play_length(seconds)?;
    let mut engine = LiveEngine::default_output();
    if let Some(seed) = seed {
        engine = engine.with_seed(seed);
    }

    let device = engine.initialize().wrap_err("no audio output")?;
    println!("=== humline ===");
    println!("Device: {}", device.name);
    println!("Sample rate: {} Hz", device.sample_rate);
    println!("Channels: {}", device.channels);
    println!();

    let latest = Rc::new(Cell::new(Telemetry::default()));
    let sink = Rc::clone(&latest);
    engine.set_telemetry_callback(move |t| sink.set(t));

    engine.start(params).wrap_err("failed to start engine")?;
    println!("Playing for {seconds:.1} s... Press Ctrl+C to stop");

    let sample_rate = device.sample_rate as f32;
    let deadline = Instant::now()
        .checked_add(length)
        .ok_or_else(|| eyre!("play length {seconds} s is too long"))?;
    while Instant::now() < deadline {
        std::thread::sleep(REPORT_INTERVAL);
        engine.poll_telemetry();

        let t = latest.get();
        let peak = engine
            .analysis_snapshot()
            .map(|frame| (frame.peak_frequency(sample_rate), frame.peak_level()))
            .unwrap_or((0.0, 0.0));

        println!(
            "envelope {:.3} {}  peak {:>7.1} Hz  level {:.3}  {}",
            t.envelope,
            if t.connected() { "CONNECTED " } else { "open      " },
            peak.0,
            peak.1,
            meter(t.envelope)
        );
    }

    engine.stop();
    Ok(())
}

/// `--seconds` as a duration; negative, NaN and infinite values are rejected.
fn play_length(seconds: f32) -> EyreResult<Duration> {
    Duration::try_from_secs_f32(seconds)
        .wrap_err_with(|| format!("invalid play length {seconds} s"))
}

fn meter(value: f32) -> String {
    let filled = (value.clamp(0.0, 1.0) * 30.0).round() as usize;
    format!("[{}{}]", "#".repeat(filled), " ".repeat(30 - filled))
}
