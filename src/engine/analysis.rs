//! Read-only analysis tap on the master output.
//!
//! The master bus pushes every output sample into a bounded queue that
//! evicts its oldest entry when full, so however rarely the tap is read it
//! always holds the most recent output. The tap drains it into a sliding
//! 2048-sample window whenever a snapshot is asked for. Nothing is computed
//! until then.

use std::sync::Arc;

use crossbeam_queue::ArrayQueue;
use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::ANALYSIS_SIZE;

/// Lowest level reported by the spectrum, in dBFS.
pub const SPECTRUM_FLOOR_DB: f32 = -120.0;

/// Output samples retained between two snapshots.
pub const ANALYSIS_RING_CAPACITY: usize = ANALYSIS_SIZE * 2;

/// Feed for the master bus and the tap that reads from it.
pub fn analysis_ring(capacity: usize) -> (AnalysisFeed, AnalysisTap) {
    let queue = Arc::new(ArrayQueue::new(capacity.max(1)));
    (
        AnalysisFeed {
            queue: Arc::clone(&queue),
        },
        AnalysisTap::new(queue),
    )
}

/// Audio-thread end of the analysis queue.
pub struct AnalysisFeed {
    queue: Arc<ArrayQueue<f32>>,
}

impl AnalysisFeed {
    /// Push a block, evicting the oldest samples when the queue is full.
    #[inline]
    pub fn push_block(&self, samples: &[f32]) {
        for &sample in samples {
            let _ = self.queue.force_push(sample);
        }
    }
}

/// One pull from the tap.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisFrame {
    /// Last `ANALYSIS_SIZE` output samples, oldest first
    pub waveform: Vec<f32>,
    /// `ANALYSIS_SIZE / 2` magnitude bins in dBFS, DC first
    pub spectrum: Vec<f32>,
}

impl AnalysisFrame {
    /// Width of one spectrum bin in Hz.
    pub fn bin_width(&self, sample_rate: f32) -> f32 {
        sample_rate / (self.spectrum.len() * 2) as f32
    }

    /// Centre frequency of the loudest bin (DC excluded).
    pub fn peak_frequency(&self, sample_rate: f32) -> f32 {
        let peak = self
            .spectrum
            .iter()
            .enumerate()
            .skip(1)
            .fold((0usize, f32::NEG_INFINITY), |best, (i, &db)| {
                if db > best.1 {
                    (i, db)
                } else {
                    best
                }
            })
            .0;
        peak as f32 * self.bin_width(sample_rate)
    }

    /// Peak absolute sample value of the waveform.
    pub fn peak_level(&self) -> f32 {
        self.waveform.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()))
    }
}

pub struct AnalysisTap {
    queue: Arc<ArrayQueue<f32>>,
    /// Sliding window of the newest samples
    history: Vec<f32>,
    incoming: Vec<f32>,
    /// Hann window coefficients
    window: Vec<f32>,
    /// Amplitude that a full-scale sine reaches in its FFT bin
    full_scale: f32,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl AnalysisTap {
    fn new(queue: Arc<ArrayQueue<f32>>) -> Self {
        let len = ANALYSIS_SIZE;
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(len);

        // Hann window - reduces spectral leakage
        let window: Vec<f32> = (0..len)
            .map(|i| {
                let denom = (len - 1) as f32;
                0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / denom).cos())
            })
            .collect();
        let full_scale = window.iter().sum::<f32>() / 2.0;

        Self {
            incoming: Vec::with_capacity(queue.capacity()),
            queue,
            history: vec![0.0; len],
            window,
            full_scale,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); len],
        }
    }

    /// Move everything pending in the queue into the sliding window.
    /// Returns the number of samples drained.
    pub fn drain(&mut self) -> usize {
        // Bounded so a producer that keeps pushing cannot grow `incoming`.
        for _ in 0..self.queue.capacity() {
            match self.queue.pop() {
                Some(sample) => self.incoming.push(sample),
                None => break,
            }
        }

        let n = self.incoming.len();
        let len = self.history.len();
        if n >= len {
            self.history.copy_from_slice(&self.incoming[n - len..]);
        } else if n > 0 {
            self.history.rotate_left(n);
            self.history[len - n..].copy_from_slice(&self.incoming);
        }
        self.incoming.clear();
        n
    }

    /// Time- and frequency-domain view of the most recent output.
    pub fn snapshot(&mut self) -> AnalysisFrame {
        self.drain();

        for ((bin, &sample), &w) in self
            .scratch
            .iter_mut()
            .zip(self.history.iter())
            .zip(self.window.iter())
        {
            *bin = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        let spectrum = self.scratch[..ANALYSIS_SIZE / 2]
            .iter()
            .map(|bin| {
                let magnitude = bin.norm() / self.full_scale;
                if magnitude > 0.0 {
                    (20.0 * magnitude.log10()).max(SPECTRUM_FLOOR_DB)
                } else {
                    SPECTRUM_FLOOR_DB
                }
            })
            .collect();

        AnalysisFrame {
            waveform: self.history.clone(),
            spectrum,
        }
    }
}
