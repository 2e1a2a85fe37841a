// crates/frameplay-pipeline/src/source.rs
//
// The source collaborator contract (spec §6): pulling packets and seeking
// the underlying stream. Out of scope per spec §1 ("container demuxing and
// packet pulling"); this is the seam a host plugs a real demuxer into.
//
// Grounded on async.c's pull_packet_func_type/seek_func_type typedefs and
// their use at the async_register_reader boundary.

use frameplay_core::Packet;

/// Status returned by `PacketSource::pull_packet`, matching spec §6's
/// pull_cb contract exactly (success / EAGAIN / EOF / fatal).
pub enum PullStatus {
    /// A packet was produced; ownership transfers to the caller.
    Packet(Packet),
    /// No packet ready yet — caller should retry after a short delay.
    Again,
    /// The stream ended cleanly.
    Eof,
}

/// The packet source collaborator: pulls encoded packets and repositions
/// the stream on seek. Implementations are NOT required to be `Send` in
/// general, but the reader stage runs on its own thread, so the concrete
/// type handed to `PipelineController::register_source` must be `Send`.
pub trait PacketSource: Send {
    /// Pull the next packet. Called only on the reader thread (spec §5:
    /// "no pipeline API may be called from within a pipeline-invoked
    /// callback").
    fn pull_packet(&mut self) -> PullStatus;

    /// Reposition the underlying stream to approximately `ts_micros`.
    /// Best-effort: real demuxers land on the nearest keyframe at or
    /// before the target (never after — landing after would skip frames
    /// the decoder needs to reconstruct the requested position, the same
    /// reasoning velocut-media/src/helpers/seek.rs documents for its own
    /// backward-seek choice). Called on the reader thread, strictly after
    /// the corresponding `Seek` message has already been pushed onto the
    /// packet queue (spec §4.2's ordering guarantee).
    ///
    /// Returns `false` on failure; the reader treats any failure as fatal
    /// and exits (spec §6: "any non-zero negative as fatal").
    fn seek(&mut self, ts_micros: i64) -> bool;
}
