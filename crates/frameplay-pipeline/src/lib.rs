// crates/frameplay-pipeline/src/lib.rs
//
// The concurrent engine: bounded message queues with bidirectional
// poisoning, the reader/decoder/filterer stage threads, the seek-injection
// protocol, the reorder/credit decoder variant, and the controller that
// ties them together for a host to drive. Plain data types (Packet,
// Frame, PipelineMessage, errors, options) live in frameplay-core; nothing
// in that crate touches a thread.

mod controller;
mod decoder_stage;
mod decoder_trait;
mod filterer;
mod queue;
mod reader;
mod reorder;
mod seek_channel;
mod source;

pub use controller::PipelineController;
pub use decoder_stage::SeekAwareSink;
pub use decoder_trait::{Decoder, FrameSink};
pub use filterer::{Filterer, PassthroughFilterer, TrimFilterer};
pub use queue::MessageQueue;
pub use reorder::{AsyncImageSource, CreditManager, ReorderingDecoder};
pub use seek_channel::SeekChannel;
pub use source::{PacketSource, PullStatus};

pub use frameplay_core::{
    DecoderOptions, Frame, FrameBuffer, ManagedImage, Packet, PipelineError, PipelineMessage,
    TimeBase,
};
