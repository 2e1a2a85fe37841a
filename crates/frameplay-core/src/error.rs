// crates/frameplay-core/src/error.rs
//
// Crate-wide typed error, decoupled from `anyhow` so it can be stashed as a
// queue's sticky poison code and handed out to every future waiter on that
// direction (see frameplay-pipeline::queue::MessageQueue).
//
// Variants map 1:1 onto the error taxonomy: end-of-stream is the normal
// terminator, the platform-specific categories are what a concrete decoder
// maps its native error codes onto at init time, and `Invariant` is for
// conditions that must never occur at runtime (an unexpected message tag,
// a reorder walk past its own tail) — these `debug_assert!` in debug builds
// and return the error in release rather than silently continuing.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    /// Normal terminator — not a failure. Propagates forward via recv-poison.
    #[error("end of stream")]
    Eof,

    /// Allocation or other resource-exhaustion failure.
    #[error("resource exhaustion: {0}")]
    ResourceExhausted(String),

    /// The packet source (demuxer/reader collaborator) failed.
    #[error("source error: {0}")]
    Source(String),

    /// The decoder collaborator failed to process a packet.
    #[error("decoder error: {0}")]
    Decoder(String),

    /// Platform decoder reported "unsupported" (maps to ENOSYS).
    #[error("unsupported codec or configuration")]
    Unsupported,

    /// Platform decoder reported malformed bitstream data (INVALIDDATA).
    #[error("invalid bitstream data")]
    InvalidData,

    /// Platform decoder malfunctioned (EINVAL).
    #[error("decoder malfunction")]
    Malfunction,

    /// Platform decoder reported something uncategorized.
    #[error("unknown decoder error")]
    Unknown,

    /// A condition the spec says must never occur at runtime.
    #[error("invariant violated: {0}")]
    Invariant(&'static str),
}

impl PipelineError {
    /// Construct from a source-collaborator failure.
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Construct from a decoder-collaborator failure.
    pub fn decoder(msg: impl Into<String>) -> Self {
        Self::Decoder(msg.into())
    }

    /// True for the normal stream terminator, as opposed to a real error.
    pub fn is_eof(&self) -> bool {
        matches!(self, PipelineError::Eof)
    }
}
