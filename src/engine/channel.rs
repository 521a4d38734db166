//! Cross-thread plumbing between the control side and the audio callback.
//!
//! Control → audio: parameter snapshots over an `rtrb` SPSC ring. The audio
//! thread drains it at the top of every callback and applies only the newest
//! snapshot (the graph diffs against what it already has, so skipping the
//! intermediate ones loses nothing).
//!
//! Audio → control: telemetry over a bounded `crossbeam_queue::ArrayQueue`
//! using `force_push`, so a slow or absent reader costs the oldest entries
//! and never blocks the audio thread.

use std::sync::Arc;

use crossbeam_queue::ArrayQueue;
use rtrb::{Consumer, Producer, RingBuffer};
use tracing::warn;

use crate::graph::Telemetry;
use crate::params::ParameterSet;

/// Pending parameter snapshots the ring can hold.
pub const PARAM_QUEUE_CAPACITY: usize = 64;

/// Telemetry entries kept for the control side.
pub const TELEMETRY_QUEUE_CAPACITY: usize = 256;

pub fn parameter_channel(capacity: usize) -> (ParamSender, ParamReceiver) {
    let (producer, consumer) = RingBuffer::new(capacity.max(1));
    (ParamSender { producer }, ParamReceiver { consumer })
}

/// Control-thread end of the parameter channel.
pub struct ParamSender {
    producer: Producer<ParameterSet>,
}

impl ParamSender {
    /// Queue a snapshot. Returns `false` (and logs) when the ring is full.
    pub fn send(&mut self, params: ParameterSet) -> bool {
        match self.producer.push(params) {
            Ok(()) => true,
            Err(_) => {
                warn!("parameter queue full, update dropped");
                false
            }
        }
    }
}

/// Audio-thread end of the parameter channel.
pub struct ParamReceiver {
    consumer: Consumer<ParameterSet>,
}

impl ParamReceiver {
    /// Drain everything pending and return the newest snapshot, if any.
    #[inline]
    pub fn latest(&mut self) -> Option<ParameterSet> {
        let mut latest = None;
        while let Ok(params) = self.consumer.pop() {
            latest = Some(params);
        }
        latest
    }
}

pub fn telemetry_channel(capacity: usize) -> (TelemetrySender, TelemetryReceiver) {
    let queue = Arc::new(ArrayQueue::new(capacity.max(1)));
    (
        TelemetrySender {
            queue: Arc::clone(&queue),
        },
        TelemetryReceiver { queue },
    )
}

/// Audio-thread end of the telemetry channel.
pub struct TelemetrySender {
    queue: Arc<ArrayQueue<Telemetry>>,
}

impl TelemetrySender {
    /// Publish, evicting the oldest entry if the queue is full.
    #[inline]
    pub fn publish(&self, telemetry: Telemetry) {
        let _ = self.queue.force_push(telemetry);
    }
}

/// Control-thread end of the telemetry channel. Cheap to clone; clones share
/// the same queue.
#[derive(Clone)]
pub struct TelemetryReceiver {
    queue: Arc<ArrayQueue<Telemetry>>,
}

impl TelemetryReceiver {
    pub fn try_recv(&self) -> Option<Telemetry> {
        self.queue.pop()
    }

    /// Drain the queue and keep only the newest entry.
    pub fn latest(&self) -> Option<Telemetry> {
        let mut latest = None;
        while let Some(t) = self.queue.pop() {
            latest = Some(t);
        }
        latest
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
