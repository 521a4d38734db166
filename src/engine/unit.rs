use crate::engine::channel::ParamReceiver;
use crate::graph::InterferenceGraph;
use crate::MAX_BLOCK_SIZE;

/// Everything the audio callback owns: the graph and the receiving end of
/// the parameter channel.
///
/// Built on the control thread, then moved into the device callback. From
/// then on it is only touched by the audio thread.
pub struct ProcessingUnit {
    graph: InterferenceGraph,
    params: ParamReceiver,
    scratch: Vec<f32>,
}

impl ProcessingUnit {
    pub fn new(graph: InterferenceGraph, params: ParamReceiver) -> Self {
        Self {
            graph,
            params,
            scratch: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn graph(&self) -> &InterferenceGraph {
        &self.graph
    }

    /// Pick up the newest parameter snapshot, if one arrived.
    #[inline]
    fn poll_params(&mut self) {
        if let Some(params) = self.params.latest() {
            self.graph.apply(params);
        }
    }

    /// Fill a mono buffer.
    pub fn render_mono(&mut self, out: &mut [f32]) {
        self.poll_params();
        self.graph.render_block(out);
    }

    /// Fill an interleaved device buffer, mono duplicated to every channel.
    pub fn render_interleaved(&mut self, data: &mut [f32], channels: usize) {
        self.poll_params();

        let channels = channels.max(1);
        let total_frames = data.len() / channels;
        let mut frames_written = 0;

        while frames_written < total_frames {
            let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
            let block = &mut self.scratch[..frames_to_render];
            self.graph.render_block(block);

            // Copy to output (mono to all channels)
            let out_off = frames_written * channels;
            for (i, &s) in block.iter().enumerate() {
                let frame = &mut data[out_off + i * channels..out_off + (i + 1) * channels];
                frame.fill(s);
            }

            frames_written += frames_to_render;
        }

        // Trailing partial frame, if the device ever hands one over
        data[total_frames * channels..].fill(0.0);
    }
}
