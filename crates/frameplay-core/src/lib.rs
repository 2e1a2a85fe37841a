// crates/frameplay-core/src/lib.rs
//
// Plain data shared between frameplay-pipeline and any host: packets,
// frames, the tagged pipeline message, timebase rescaling, decoder options
// and the crate-wide error type. No threading, no channels — those live in
// frameplay-pipeline.

mod error;
mod frame;
mod message;
mod options;
mod packet;
mod timebase;

pub use error::{PipelineError, Result};
pub use frame::{Frame, FrameBuffer, ManagedImage};
pub use message::PipelineMessage;
pub use options::{DecoderOptions, MAX_QUEUE_CAPACITY, MIN_QUEUE_CAPACITY, SINK_QUEUE_CAPACITY};
pub use packet::Packet;
pub use timebase::TimeBase;
