// crates/frameplay-core/src/message.rs
//
// The tagged union exchanged on pkt_queue (spec §3, §9 "implement as a sum
// type"). Grounded on async.c's `enum msg_type { MSG_PACKET, MSG_SEEK }` /
// `struct message`.

use crate::Packet;

/// A message exchanged on the packet queue between reader and decoder.
pub enum PipelineMessage {
    /// Forward progress: an encoded packet.
    Data(Packet),
    /// Control message that preempts pending data via queue flush (spec
    /// §4.2). Carries the seek target in microseconds.
    Seek(i64),
}
