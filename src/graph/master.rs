use crate::dsp::ramp::LinearRamp;
use crate::engine::analysis::AnalysisFeed;
use crate::graph::node::{Lanes, RenderCtx, Stage};
use crate::params::{ParamId, UNIT_RANGE};

/*
Master Bus
==========

    out(t) = clamp((main(t) + arc(t)) · masterVolume, -1, 1)

The tape-processed main path and the arc branch meet here. Volume is ramped
like every other gain. The result is written back into the `main` lane,
which the graph copies to the device buffer.

An optional analysis feed receives every output sample. When the reader
falls behind the oldest queued samples are evicted, so the tap always sees
the newest output and the audio thread never waits for it.
*/

pub struct MasterBus {
    volume: LinearRamp,
    tap: Option<AnalysisFeed>,
}

impl MasterBus {
    pub fn new(master_volume: f32) -> Self {
        Self {
            volume: LinearRamp::new(UNIT_RANGE.clamp(master_volume)),
            tap: None,
        }
    }

    /// Attach the audio side of an analysis queue.
    pub fn with_tap(mut self, tap: AnalysisFeed) -> Self {
        self.tap = Some(tap);
        self
    }

    pub fn set_tap(&mut self, tap: Option<AnalysisFeed>) {
        self.tap = tap;
    }

    pub fn volume(&self) -> f32 {
        self.volume.value()
    }
}

impl Stage for MasterBus {
    fn process(&mut self, lanes: &mut Lanes, _ctx: &RenderCtx) {
        let n = lanes.len();
        for i in 0..n {
            let gain = self.volume.next_value();
            let out = ((lanes.main[i] + lanes.arc[i]) * gain).clamp(-1.0, 1.0);
            lanes.main[i] = out;
        }

        if let Some(tap) = &self.tap {
            tap.push_block(&lanes.main[..n]);
        }
    }

    fn set_param(&mut self, id: ParamId, value: f32, ramp_samples: usize) {
        if id == ParamId::MasterVolume {
            self.volume.set_target(UNIT_RANGE.clamp(value), ramp_samples);
        }
    }

    fn reset(&mut self) {}

    fn name(&self) -> &'static str {
        "master-bus"
    }
}
