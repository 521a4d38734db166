//! Live runtime: device acquisition, cross-thread channels and lifecycle.

/*
Lifecycle
=========

    ┌─────────┐ initialize / load_processing_unit ┌──────────────┐  start  ┌─────────┐
    │ Stopped │ ─────────────────────────────────► │ Initializing │ ──────► │ Running │
    └─────────┘                                    └──────────────┘         └─────────┘
         ▲              failure (any step)                │                      │
         └────────────────────────────────────────────────┴──────── stop ────────┘

- `start` runs whatever acquisition steps are still missing, so calling it
  straight from `Stopped` is fine.
- `start` while running and `stop` while stopped are no-ops.
- `stop` drops the stream, which drops the processing unit and every stage
  in it. The next `start` builds a fresh graph from scratch.
- `update_params` while not running is a no-op.

Threads
=======

    control thread                         audio thread
    ──────────────                         ────────────
    update_params ──► rtrb ring (64) ────► ProcessingUnit::render_*
    poll_telemetry ◄── ArrayQueue (drop-oldest) ◄── InterferenceGraph
    analysis_tap  ◄── ArrayQueue (drop-oldest) ◄─── MasterBus
*/

pub mod analysis;
pub mod backend;
pub mod channel;
pub mod unit;

use tracing::{debug, info, warn};

use crate::error::{EngineError, Result};
use crate::graph::{InterferenceGraph, Telemetry};
use crate::params::ParameterSet;

use self::analysis::{analysis_ring, AnalysisFeed, AnalysisTap, ANALYSIS_RING_CAPACITY};
use self::backend::{AudioBackend, CpalBackend, DeviceHandle};
use self::channel::{
    parameter_channel, telemetry_channel, ParamReceiver, ParamSender, TelemetryReceiver,
    TelemetrySender, PARAM_QUEUE_CAPACITY, TELEMETRY_QUEUE_CAPACITY,
};
use self::unit::ProcessingUnit;

pub use analysis::AnalysisFrame;
pub use backend::HeadlessBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Stopped,
    Initializing,
    Running,
}

/// Audio-side channel ends, created by `load_processing_unit` and consumed
/// by `start`.
struct PreparedUnit {
    params: ParamReceiver,
    telemetry: TelemetrySender,
    tap: AnalysisFeed,
}

type TelemetryCallback = Box<dyn FnMut(Telemetry)>;

pub struct LiveEngine<B: AudioBackend = CpalBackend> {
    backend: B,
    state: EngineState,
    seed: Option<u64>,
    params: ParameterSet,

    device: Option<DeviceHandle>,
    prepared: Option<PreparedUnit>,
    stream: Option<B::Stream>,

    param_tx: Option<ParamSender>,
    telemetry_rx: Option<TelemetryReceiver>,
    analysis: Option<AnalysisTap>,
    telemetry_callback: Option<TelemetryCallback>,
}

impl LiveEngine<CpalBackend> {
    /// Engine on the system's default output device.
    pub fn default_output() -> Self {
        Self::new(CpalBackend::new())
    }
}

impl<B: AudioBackend> LiveEngine<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: EngineState::Stopped,
            seed: None,
            params: ParameterSet::default(),
            device: None,
            prepared: None,
            stream: None,
            param_tx: None,
            telemetry_rx: None,
            analysis: None,
            telemetry_callback: None,
        }
    }

    /// Seed the spark generator so every start reproduces the same sequence.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == EngineState::Running
    }

    /// Last snapshot handed to `start` or `update_params` (clamped).
    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn device(&self) -> Option<&DeviceHandle> {
        self.device.as_ref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Acquire the output device. Cached until `stop`.
    pub fn initialize(&mut self) -> Result<DeviceHandle> {
        if let Some(device) = &self.device {
            return Ok(device.clone());
        }

        if self.state == EngineState::Stopped {
            self.state = EngineState::Initializing;
        }

        match self.backend.acquire_device() {
            Ok(device) => {
                info!(
                    device = %device.name,
                    sample_rate = device.sample_rate,
                    channels = device.channels,
                    "output device acquired"
                );
                self.device = Some(device.clone());
                Ok(device)
            }
            Err(err) => {
                warn!("device acquisition failed: {err}");
                self.release();
                Err(err)
            }
        }
    }

    /// Set up the channels and analysis ring the audio side will need.
    /// Idempotent; acquires the device first if necessary.
    pub fn load_processing_unit(&mut self) -> Result<()> {
        if self.prepared.is_some() || self.stream.is_some() {
            return Ok(());
        }

        let device = self.initialize()?;
        if let Err(err) = self.prepare(&device) {
            warn!("processing unit failed to load: {err}");
            self.release();
            return Err(err);
        }

        debug!("processing unit loaded");
        Ok(())
    }

    fn prepare(&mut self, device: &DeviceHandle) -> Result<()> {
        if device.sample_rate == 0 || device.channels == 0 {
            return Err(EngineError::ProcessingUnitLoadFailed(format!(
                "unusable device config: {} Hz, {} channels",
                device.sample_rate, device.channels
            )));
        }
        self.backend.prepare(device)?;

        let (param_tx, param_rx) = parameter_channel(PARAM_QUEUE_CAPACITY);
        let (telemetry_tx, telemetry_rx) = telemetry_channel(TELEMETRY_QUEUE_CAPACITY);
        let (tap_feed, tap) = analysis_ring(ANALYSIS_RING_CAPACITY);

        self.prepared = Some(PreparedUnit {
            params: param_rx,
            telemetry: telemetry_tx,
            tap: tap_feed,
        });
        self.param_tx = Some(param_tx);
        self.telemetry_rx = Some(telemetry_rx);
        self.analysis = Some(tap);
        self.state = EngineState::Initializing;
        Ok(())
    }

    /// Build a fresh graph from `params` and start the device stream.
    pub fn start(&mut self, params: ParameterSet) -> Result<()> {
        if self.state == EngineState::Running {
            debug!("start ignored, already running");
            return Ok(());
        }

        self.load_processing_unit()?;

        let (device, prepared) = match (self.device.clone(), self.prepared.take()) {
            (Some(device), Some(prepared)) => (device, prepared),
            _ => {
                self.release();
                return Err(EngineError::ProcessingUnitLoadFailed(
                    "processing unit missing after load".into(),
                ));
            }
        };

        let params = params.clamped();
        let mut graph =
            InterferenceGraph::with_tap(params, device.sample_rate as f32, self.seed, prepared.tap);
        graph.set_telemetry(Some(prepared.telemetry));
        let unit = ProcessingUnit::new(graph, prepared.params);

        match self.backend.open_stream(&device, unit) {
            Ok(stream) => {
                self.stream = Some(stream);
                self.params = params;
                self.state = EngineState::Running;
                info!(sample_rate = device.sample_rate, "engine running");
                Ok(())
            }
            Err(err) => {
                warn!("stream failed to start: {err}");
                self.release();
                Err(err)
            }
        }
    }

    /// Stop the stream and release every resource. No-op when stopped.
    pub fn stop(&mut self) {
        if self.state == EngineState::Stopped {
            return;
        }
        self.release();
        info!("engine stopped");
    }

    fn release(&mut self) {
        // Stream first so the audio thread is gone before its channels
        self.stream = None;
        self.prepared = None;
        self.param_tx = None;
        self.telemetry_rx = None;
        self.analysis = None;
        self.device = None;
        self.state = EngineState::Stopped;
    }

    /// Send a new snapshot to the running graph. Continuous controls ramp
    /// over 50 ms; the rest switch at the next block. No-op unless running.
    pub fn update_params(&mut self, params: ParameterSet) {
        if self.state != EngineState::Running {
            debug!("update_params ignored, engine not running");
            return;
        }

        let params = params.clamped();
        if let Some(tx) = self.param_tx.as_mut() {
            if tx.send(params) {
                self.params = params;
            }
        }
    }

    /// Waveform/spectrum tap on the master output, available once the
    /// processing unit is loaded.
    pub fn analysis_tap(&mut self) -> Option<&mut AnalysisTap> {
        self.analysis.as_mut()
    }

    /// Convenience for `analysis_tap().map(|t| t.snapshot())`.
    pub fn analysis_snapshot(&mut self) -> Option<AnalysisFrame> {
        self.analysis.as_mut().map(AnalysisTap::snapshot)
    }

    /// Callback for telemetry, run on the control thread by
    /// [`poll_telemetry`](Self::poll_telemetry).
    pub fn set_telemetry_callback<F>(&mut self, callback: F)
    where
        F: FnMut(Telemetry) + 'static,
    {
        self.telemetry_callback = Some(Box::new(callback));
    }

    /// Drain pending telemetry into the callback. Returns the number of
    /// entries delivered (0 without a callback or a loaded unit).
    pub fn poll_telemetry(&mut self) -> usize {
        let (Some(rx), Some(callback)) = (self.telemetry_rx.as_ref(), self.telemetry_callback.as_mut())
        else {
            return 0;
        };

        let mut delivered = 0;
        while let Some(t) = rx.try_recv() {
            callback(t);
            delivered += 1;
        }
        delivered
    }

    /// Direct access to the telemetry queue, for callers that poll it
    /// themselves.
    pub fn telemetry(&self) -> Option<TelemetryReceiver> {
        self.telemetry_rx.clone()
    }
}

impl<B: AudioBackend> Drop for LiveEngine<B> {
    fn drop(&mut self) {
        self.release();
    }
}
