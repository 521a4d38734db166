use crate::{params::ParamId, MAX_BLOCK_SIZE};

/// Context passed to stages during rendering
///
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - frame: Index of the first sample of this block since the graph started
pub struct RenderCtx {
    pub sample_rate: f32,
    pub frame: u64,
}

impl RenderCtx {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            frame: 0,
        }
    }

    /// Time in seconds of the first sample of the block.
    pub fn time(&self) -> f64 {
        self.frame as f64 / self.sample_rate as f64
    }
}

/// Per-block signal lanes shared by every stage.
///
/// Stages read the lanes written by earlier stages and write their own.
/// All lanes are preallocated to `MAX_BLOCK_SIZE`; only the first `len()`
/// samples are meaningful for the current block.
pub struct Lanes {
    /// Contact envelope, [0, 1]
    pub envelope: Vec<f32>,
    /// Connection mask, exactly 0.0 or 1.0
    pub mask: Vec<f32>,
    /// Ungated spark signal
    pub spark: Vec<f32>,
    /// Summed harmonic bank output
    pub hum: Vec<f32>,
    /// Main signal path (mixer → ring mod → tape → master)
    pub main: Vec<f32>,
    /// Arc branch output, summed at the master bus
    pub arc: Vec<f32>,
    len: usize,
}

impl Lanes {
    pub fn new() -> Self {
        Self {
            envelope: vec![0.0; MAX_BLOCK_SIZE],
            mask: vec![0.0; MAX_BLOCK_SIZE],
            spark: vec![0.0; MAX_BLOCK_SIZE],
            hum: vec![0.0; MAX_BLOCK_SIZE],
            main: vec![0.0; MAX_BLOCK_SIZE],
            arc: vec![0.0; MAX_BLOCK_SIZE],
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Start a new block of `len` samples (capped at `MAX_BLOCK_SIZE`).
    pub fn begin_block(&mut self, len: usize) {
        self.len = len.min(MAX_BLOCK_SIZE);
    }

    pub fn clear(&mut self) {
        for lane in [
            &mut self.envelope,
            &mut self.mask,
            &mut self.spark,
            &mut self.hum,
            &mut self.main,
            &mut self.arc,
        ] {
            lane.fill(0.0);
        }
        self.len = 0;
    }
}

impl Default for Lanes {
    fn default() -> Self {
        Self::new()
    }
}

/// Core trait for pipeline stages
///
/// A stage owns its state (phases, filter memory, delay buffers) and is only
/// ever touched by the thread running the graph.
pub trait Stage: Send {
    fn process(&mut self, lanes: &mut Lanes, ctx: &RenderCtx);

    /// Receive a new value for one control.
    ///
    /// Continuous controls glide over `ramp_samples`; discrete ones (window
    /// sizes, thresholds, curves) switch immediately and ignore it. Stages
    /// ignore controls they do not use.
    fn set_param(&mut self, _id: ParamId, _value: f32, _ramp_samples: usize) {
        // Default: not interested
    }

    /// Back to initial state: phases at zero, buffers empty.
    fn reset(&mut self);

    fn name(&self) -> &'static str;
}

/// Allow boxed stages to be used as stages (for dynamic dispatch)
impl Stage for Box<dyn Stage> {
    fn process(&mut self, lanes: &mut Lanes, ctx: &RenderCtx) {
        (**self).process(lanes, ctx)
    }

    fn set_param(&mut self, id: ParamId, value: f32, ramp_samples: usize) {
        (**self).set_param(id, value, ramp_samples)
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
