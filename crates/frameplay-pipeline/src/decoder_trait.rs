// crates/frameplay-pipeline/src/decoder_trait.rs
//
// The generic decoder collaborator contract (spec §6) plus the frame
// emission sink it calls back into (spec §4.3's "Frame emission callback").
//
// Grounded on async.c's decoder_init/push_packet/flush/uninit vtable
// (instantiated concretely as decoder_vt in decoder_vt.c) and on
// async_queue_frame as the shape `FrameSink::emit` takes.
//
// Unlike the C version, `init` is handed the sink once, up front, as an
// `Arc<dyn FrameSink>` — not threaded through every call — because the
// reorder/credit variant (spec §4.4) emits frames from its own internal
// worker, potentially concurrently with push_packet returning on the
// decoder thread. A `&mut` callback parameter can't outlive the call it's
// passed to; an owned, thread-safe handle can.

use std::sync::Arc;

use frameplay_core::{Frame, Packet, PipelineError};

/// Where a `Decoder` impl delivers decoded frames. Implemented by
/// `decoder_stage::SeekAwareSink`, which holds the cached-frame /
/// seek-rewrite state described in spec §4.3.
pub trait FrameSink: Send + Sync {
    /// Emit a decoded frame, or `None` to signal "this decode segment has
    /// no more frames" (spec §4.3: "if f == null ... return EOF to
    /// caller"). May be called from any thread.
    fn emit(&self, frame: Option<Frame>) -> Result<(), PipelineError>;
}

/// The generic decoder interface (spec §6). A concrete decoder owns
/// whatever codec state it needs and reports decoded frames through the
/// `FrameSink` it's handed at `init`.
pub trait Decoder: Send {
    /// One-time setup. Frames produced from here on must go through `sink`.
    fn init(&mut self, sink: Arc<dyn FrameSink>) -> Result<(), PipelineError>;

    /// Feed one packet. An empty packet (`Packet::is_empty`) requests a
    /// drain: the decoder should push out any internally buffered frames
    /// and return `Err(PipelineError::Eof)` once nothing remains (mirrors
    /// async.c's teardown loop feeding empty `AVPacket`s until the
    /// decoder stops returning `0`/`EAGAIN`).
    fn push_packet(&mut self, pkt: &Packet) -> Result<(), PipelineError>;

    /// Flush on seek: drain any frames decoded-but-not-yet-emitted through
    /// `sink`, then call `sink.emit(None)` exactly once to let the sink
    /// flush its cached pre-seek frame (spec §4.3's `queue_cached_frame`).
    /// Must not leave any packet in flight — the decoder stage assumes
    /// that after `flush` returns, `emit` will not be called again until a
    /// new packet is pushed (spec §4.3's comment on `decoder_flush`).
    fn flush(&mut self);

    /// Release codec resources. Called once, after the packet loop ends.
    fn uninit(&mut self);
}
