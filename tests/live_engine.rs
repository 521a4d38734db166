use std::cell::RefCell;
use std::rc::Rc;

use humline::engine::backend::HeadlessBackend;
use humline::graph::node::{Lanes, RenderCtx, Stage};
use humline::graph::{InterferenceGraph, MasterBus};
use humline::params::{presets, ParamId};
use humline::{ms_to_samples, EngineError, EngineState, LiveEngine, ParameterSet, RAMP_MS};

fn engine() -> (LiveEngine<HeadlessBackend>, humline::engine::backend::HeadlessHandle) {
    let backend = HeadlessBackend::new(48_000, 2);
    let handle = backend.handle();
    (LiveEngine::new(backend).with_seed(99), handle)
}

#[test]
fn start_stop_start_builds_a_fresh_graph() {
    let (mut engine, handle) = engine();
    let mut block = vec![0.0; 512];

    engine.start(ParameterSet::default()).unwrap();
    assert_eq!(handle.pull(&mut block), 512);
    assert_eq!(handle.active_streams(), 1);

    engine.stop();
    assert_eq!(engine.state(), EngineState::Stopped);
    assert_eq!(handle.active_streams(), 0);
    assert_eq!(handle.pull(&mut block), 0);

    engine.start(ParameterSet::default()).unwrap();
    assert_eq!(engine.state(), EngineState::Running);
    assert_eq!(handle.active_streams(), 1);
    assert_eq!(handle.streams_opened(), 2);
    assert_eq!(handle.pull(&mut block), 512);
}

#[test]
fn restarted_graph_starts_from_initial_state() {
    let (mut engine, handle) = engine();
    let mut first = vec![0.0; 1_024];
    let mut second = vec![0.0; 1_024];

    engine.start(presets::HEAVY_CRACKLE).unwrap();
    handle.pull(&mut first);
    engine.stop();

    engine.start(presets::HEAVY_CRACKLE).unwrap();
    handle.pull(&mut second);

    // same seed, fresh phases and buffers
    assert_eq!(first, second);
}

#[test]
fn device_failure_is_distinguishable() {
    let mut engine = LiveEngine::new(HeadlessBackend::new(48_000, 2).fail_device());
    let err = engine.start(ParameterSet::default()).unwrap_err();
    assert!(matches!(err, EngineError::DeviceUnavailable(_)));
    assert_eq!(engine.state(), EngineState::Stopped);
}

#[test]
fn processing_unit_failure_is_distinguishable() {
    let mut engine = LiveEngine::new(HeadlessBackend::new(48_000, 2).fail_processing_unit());
    let err = engine.start(ParameterSet::default()).unwrap_err();
    assert!(matches!(err, EngineError::ProcessingUnitLoadFailed(_)));
    assert_eq!(engine.state(), EngineState::Stopped);

    let mut engine = LiveEngine::new(HeadlessBackend::new(0, 2));
    let err = engine.load_processing_unit().unwrap_err();
    assert!(matches!(err, EngineError::ProcessingUnitLoadFailed(_)));
}

#[test]
fn stream_failure_leaves_engine_stopped() {
    let backend = HeadlessBackend::new(48_000, 2).fail_stream();
    let handle = backend.handle();
    let mut engine = LiveEngine::new(backend);

    let err = engine.start(ParameterSet::default()).unwrap_err();
    assert!(matches!(err, EngineError::StreamFailed(_)));
    assert_eq!(engine.state(), EngineState::Stopped);
    assert_eq!(handle.active_streams(), 0);
}

#[test]
fn telemetry_reaches_the_callback() {
    let (mut engine, handle) = engine();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    engine.set_telemetry_callback(move |t| sink.borrow_mut().push(t));

    engine.start(ParameterSet::default()).unwrap();
    let mut block = vec![0.0; 1_280];
    handle.pull(&mut block);

    assert_eq!(engine.poll_telemetry(), 10);
    let seen = seen.borrow();
    assert!(seen.iter().all(|t| (0.0..=1.0).contains(&t.envelope)));
    assert!(seen.iter().all(|t| t.mask == 0.0 || t.mask == 1.0));
}

#[test]
fn analysis_tap_sees_output() {
    let (mut engine, handle) = engine();
    engine.start(presets::DEEP_RUMBLE).unwrap();

    let mut block = vec![0.0; 4_096];
    handle.pull(&mut block);

    let frame = engine.analysis_snapshot().unwrap();
    assert_eq!(frame.waveform.as_slice(), &block[2_048..]);
    assert_eq!(frame.spectrum.len(), 1_024);
}

#[test]
fn analysis_tap_stays_current_when_polled_late() {
    let (mut engine, handle) = engine();
    engine.start(presets::UNSTABLE_SIGNAL).unwrap();

    // half a second of output, far more than the tap retains
    let mut output = vec![0.0; 24_000];
    for block in output.chunks_mut(2_048) {
        handle.pull(block);
    }

    let frame = engine.analysis_snapshot().unwrap();
    assert_eq!(frame.waveform.as_slice(), &output[output.len() - 2_048..]);
}

#[test]
fn updates_reach_the_running_graph() {
    let (mut engine, handle) = engine();
    engine.start(ParameterSet::default()).unwrap();

    engine.update_params(ParameterSet {
        master_volume: 0.0,
        ..ParameterSet::default()
    });
    assert_eq!(engine.params().master_volume, 0.0);

    // 50 ms ramp down, then silence
    let mut block = vec![0.0; 4_800];
    handle.pull(&mut block);
    assert!(block[2_400..].iter().all(|&s| s == 0.0));
}

#[test]
fn master_volume_ramps_linearly_over_50ms() {
    let sample_rate = 48_000.0;
    let ramp = ms_to_samples(RAMP_MS, sample_rate);
    assert_eq!(ramp, 2_400);

    let (a, b) = (0.2f32, 0.8f32);
    let mut master = MasterBus::new(a);
    master.set_param(ParamId::MasterVolume, b, ramp);

    // unit input on `main`, so the output is the gain itself
    let mut gains = Vec::with_capacity(ramp + 100);
    let mut lanes = Lanes::new();
    let ctx = RenderCtx::new(sample_rate);
    while gains.len() < ramp + 100 {
        lanes.begin_block(1_000);
        lanes.main[..1_000].fill(1.0);
        lanes.arc[..1_000].fill(0.0);
        master.process(&mut lanes, &ctx);
        gains.extend_from_slice(&lanes.main[..1_000]);
    }

    assert_eq!(gains[0], a);
    assert_eq!(gains[ramp], b);
    for k in 1..=ramp {
        let expected = a + (b - a) * k as f32 / ramp as f32;
        assert!((gains[k] - expected).abs() < 1e-4, "sample {k}");
        assert!(gains[k] >= gains[k - 1]);
    }
    assert!(gains[ramp..].iter().all(|&g| g == b));
}

#[test]
fn engine_volume_update_ramps_linearly() {
    // lowest threshold keeps the contact closed, so the hum is always present
    let params = ParameterSet {
        threshold: 0.1,
        master_volume: 0.8,
        ..presets::DEEP_RUMBLE
    };
    let (mut steady, steady_out) = engine();
    let (mut updated, updated_out) = engine();
    steady.start(params).unwrap();
    updated.start(params).unwrap();

    let mut a = vec![0.0; 1_000];
    let mut b = vec![0.0; 1_000];
    steady_out.pull(&mut a);
    updated_out.pull(&mut b);
    assert_eq!(a, b);

    updated.update_params(ParameterSet {
        master_volume: 0.2,
        ..params
    });

    // same seed, so the only difference is the master gain: b / a = g(k) / 0.8
    let ramp = ms_to_samples(RAMP_MS, 48_000.0);
    let mut a = vec![0.0; ramp + 600];
    let mut b = vec![0.0; ramp + 600];
    steady_out.pull(&mut a);
    updated_out.pull(&mut b);

    let mut checked = 0;
    for k in 0..a.len() {
        // skip near-silence and anything the master clamp touched
        if a[k].abs() < 1e-3 || a[k].abs() >= 0.999 {
            continue;
        }
        let gain = 0.8 + (0.2 - 0.8) * k.min(ramp) as f32 / ramp as f32;
        let ratio = b[k] / a[k];
        assert!((ratio - gain / 0.8).abs() < 1e-3, "sample {k}: {ratio}");
        checked += 1;
    }
    assert!(checked > ramp / 2);
}

#[test]
fn graph_uses_50ms_ramps() {
    let graph = InterferenceGraph::new(ParameterSet::default(), 44_100.0, Some(1));
    assert_eq!(graph.ramp_samples(), 2_205);
}
