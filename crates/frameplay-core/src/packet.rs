// crates/frameplay-core/src/packet.rs
//
// An opaque chunk of encoded bytes plus a presentation timestamp in the
// source time base (spec §3). Exclusively owned after production by the
// source callback; consumed and released by the decoder.

use std::sync::Arc;

use crate::TimeBase;

/// An encoded, pre-decode unit of data with a timestamp.
#[derive(Clone, Debug)]
pub struct Packet {
    /// Encoded bytes. `Arc` because a flushed-but-in-flight packet may
    /// briefly be referenced from both the queue's drain path and a
    /// caller holding onto the original for logging.
    pub data: Arc<[u8]>,
    /// Presentation timestamp in `timebase` units.
    pub pts: i64,
    pub timebase: TimeBase,
}

impl Packet {
    pub fn new(data: impl Into<Arc<[u8]>>, pts: i64, timebase: TimeBase) -> Self {
        Self { data: data.into(), pts, timebase }
    }

    /// An empty packet, used by the decoder stage's teardown drain and by
    /// the reorder/credit decoder variant as its EOF marker (spec §4.3,
    /// §4.4: "If packet is empty (EOF marker)...").
    pub fn empty(timebase: TimeBase) -> Self {
        Self { data: Arc::from(&[][..]), pts: 0, timebase }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn pts_micros(&self) -> i64 {
        self.timebase.to_micros(self.pts)
    }
}
