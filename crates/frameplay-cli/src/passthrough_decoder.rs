// crates/frameplay-cli/src/passthrough_decoder.rs
//
// A minimal synchronous `Decoder`: one packet in, one frame out, pts
// rescaled to microseconds. Stands in for a real codec so the demo binary
// can exercise the seek-aware emission path without decoding anything.

use std::sync::Arc;

use frameplay_pipeline::{Decoder, Frame, FrameSink, Packet, PipelineError};

pub struct PassthroughDecoder {
    sink: Option<Arc<dyn FrameSink>>,
}

impl PassthroughDecoder {
    pub fn new() -> Self {
        Self { sink: None }
    }
}

impl Decoder for PassthroughDecoder {
    fn init(&mut self, sink: Arc<dyn FrameSink>) -> Result<(), PipelineError> {
        self.sink = Some(sink);
        Ok(())
    }

    fn push_packet(&mut self, pkt: &Packet) -> Result<(), PipelineError> {
        let sink = self.sink.as_ref().ok_or(PipelineError::Invariant("push_packet before init"))?;
        if pkt.is_empty() {
            return Err(PipelineError::Eof);
        }
        let frame = Frame::cpu(pkt.pts_micros(), 1, 1, vec![0]);
        sink.emit(Some(frame))
    }

    fn flush(&mut self) {
        if let Some(sink) = &self.sink {
            let _ = sink.emit(None);
        }
    }

    fn uninit(&mut self) {
        self.sink = None;
    }
}
