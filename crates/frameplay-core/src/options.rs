// crates/frameplay-core/src/options.rs
//
// Plain configuration struct, no builder — mirrors velocut-media's
// EncodeSpec/ClipSpec (public fields, constructed by the caller as a
// literal). Defaults and valid ranges are grounded on async.c's
// async_decoder_options AVOption table: max_packets_queue default 5,
// max_frames_queue default 3, both range 1..100.

use crate::error::{PipelineError, Result};

/// Capacity of `pkt_queue`. Range 1..100.
pub const MIN_QUEUE_CAPACITY: usize = 1;
pub const MAX_QUEUE_CAPACITY: usize = 100;

/// The sink queue has a fixed capacity regardless of `DecoderOptions`
/// (spec §4.1, §6: "Sink queue capacity: fixed default of 3 frames").
pub const SINK_QUEUE_CAPACITY: usize = 3;

/// Configuration options recognized by the decoder component (spec §6).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Capacity of `pkt_queue`. Default 5.
    pub max_packets_queue: usize,
    /// Capacity of `frame_queue`. Default 3.
    pub max_frames_queue: usize,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self { max_packets_queue: 5, max_frames_queue: 3 }
    }
}

impl DecoderOptions {
    pub fn new(max_packets_queue: usize, max_frames_queue: usize) -> Self {
        Self { max_packets_queue, max_frames_queue }
    }

    /// Enforces the documented 1..100 range for both queue capacities.
    pub fn validate(&self) -> Result<()> {
        let in_range = |n: usize| (MIN_QUEUE_CAPACITY..=MAX_QUEUE_CAPACITY).contains(&n);
        if !in_range(self.max_packets_queue) {
            return Err(PipelineError::Invariant(
                "max_packets_queue out of range 1..100",
            ));
        }
        if !in_range(self.max_frames_queue) {
            return Err(PipelineError::Invariant(
                "max_frames_queue out of range 1..100",
            ));
        }
        Ok(())
    }
}
