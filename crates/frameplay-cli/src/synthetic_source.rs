// crates/frameplay-cli/src/synthetic_source.rs
//
// A deterministic, in-memory PacketSource for exercising the pipeline
// without a real demuxer (spec §6's source collaborator is explicitly out
// of scope; this is the minimal stand-in a host needs to drive it).

use std::sync::Arc;

use frameplay_pipeline::{Packet, PacketSource, PullStatus, TimeBase};

/// Produces `frame_count` packets at a fixed `fps`, each carrying no real
/// payload (a single marker byte), one pts per frame in `1/fps` units.
pub struct SyntheticSource {
    timebase: TimeBase,
    frame_count: i64,
    cursor: i64,
}

impl SyntheticSource {
    pub fn new(fps: i64, frame_count: i64) -> Self {
        Self { timebase: TimeBase::new(1, fps), frame_count, cursor: 0 }
    }
}

impl PacketSource for SyntheticSource {
    fn pull_packet(&mut self) -> PullStatus {
        if self.cursor >= self.frame_count {
            return PullStatus::Eof;
        }
        let pts = self.cursor;
        self.cursor += 1;
        PullStatus::Packet(Packet::new(Arc::<[u8]>::from(&b"f"[..]), pts, self.timebase))
    }

    fn seek(&mut self, ts_micros: i64) -> bool {
        let target_pts = TimeBase::MICROSECONDS.rescale(ts_micros, self.timebase);
        self.cursor = target_pts.clamp(0, self.frame_count);
        true
    }
}
