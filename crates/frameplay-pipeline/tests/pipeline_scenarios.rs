// crates/frameplay-pipeline/tests/pipeline_scenarios.rs
//
// End-to-end tests driving PipelineController through its public API with
// a deterministic in-memory source and an echo decoder, instead of
// per-module unit tests. Seeks issued with `PipelineController::seek`
// before `start` (or via `start`'s own `skip_ts` argument) are guaranteed
// to be the request the reader observes on its very first loop iteration,
// since the seek slot is populated before the reader thread is spawned —
// this is what keeps these tests deterministic rather than racing the
// background threads.

use std::sync::{Arc, Mutex};

use frameplay_pipeline::{
    DecoderOptions, Decoder, Frame, FrameSink, Packet, PacketSource, PipelineController,
    PipelineError, PullStatus, TimeBase, TrimFilterer,
};

/// Emits one packet per entry in `pts_values`, in order, then EOF.
/// `reposition_on_seek` controls whether `seek` actually moves the
/// cursor (a real demuxer would) or is a no-op that still reports success
/// (a source with no keyframe anywhere near the target) — scenario 4
/// specifically needs the no-op behaviour so every packet still arrives
/// after the seek control message.
struct VecSource {
    pts_values: Vec<i64>,
    cursor: usize,
    reposition_on_seek: bool,
    seeks: Arc<Mutex<Vec<i64>>>,
}

impl VecSource {
    fn new(pts_values: Vec<i64>, reposition_on_seek: bool) -> Self {
        Self { pts_values, cursor: 0, reposition_on_seek, seeks: Arc::new(Mutex::new(Vec::new())) }
    }

    fn seeks_handle(&self) -> Arc<Mutex<Vec<i64>>> {
        self.seeks.clone()
    }
}

impl PacketSource for VecSource {
    fn pull_packet(&mut self) -> PullStatus {
        if self.cursor >= self.pts_values.len() {
            return PullStatus::Eof;
        }
        let pts = self.pts_values[self.cursor];
        self.cursor += 1;
        PullStatus::Packet(Packet::new(Arc::<[u8]>::from(&b"x"[..]), pts, TimeBase::MICROSECONDS))
    }

    fn seek(&mut self, ts_micros: i64) -> bool {
        self.seeks.lock().unwrap().push(ts_micros);
        if self.reposition_on_seek {
            self.cursor = self.pts_values.iter().position(|&p| p >= ts_micros).unwrap_or(self.pts_values.len());
        }
        true
    }
}

/// A decoder with no codec state of its own: one packet in, one frame out,
/// pts carried straight through. All reordering/caching behaviour under
/// test lives in the seek-aware sink the decoder stage wraps around this,
/// not in the decoder itself.
struct EchoDecoder {
    sink: Option<Arc<dyn FrameSink>>,
}

impl EchoDecoder {
    fn new() -> Self {
        Self { sink: None }
    }
}

impl Decoder for EchoDecoder {
    fn init(&mut self, sink: Arc<dyn FrameSink>) -> Result<(), PipelineError> {
        self.sink = Some(sink);
        Ok(())
    }

    fn push_packet(&mut self, pkt: &Packet) -> Result<(), PipelineError> {
        let sink = self.sink.as_ref().ok_or(PipelineError::Invariant("push_packet before init"))?;
        if pkt.is_empty() {
            return Err(PipelineError::Eof);
        }
        sink.emit(Some(Frame::cpu(pkt.pts_micros(), 1, 1, vec![0])))
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

fn ten_frame_pts() -> Vec<i64> {
    (0..10).map(|i| i * 40_000).collect()
}

#[test]
fn s1_simple_start_pop_stop() {
    let controller = PipelineController::alloc(DecoderOptions::default()).unwrap();
    controller.register_source(Box::new(VecSource::new(ten_frame_pts(), false))).unwrap();
    controller.register_decoder(Box::new(EchoDecoder::new())).unwrap();
    controller.start(0).unwrap();

    for expected in ten_frame_pts() {
        let frame = controller.pop_frame().unwrap();
        assert_eq!(frame.pts_micros, expected);
    }
    assert!(matches!(controller.pop_frame(), Err(PipelineError::Eof)));
}

#[test]
fn s2_seek_forward_lands_on_the_target_with_nothing_larger_ahead_of_it() {
    let controller = PipelineController::alloc(DecoderOptions::default()).unwrap();
    controller.register_source(Box::new(VecSource::new(ten_frame_pts(), true))).unwrap();
    controller.register_decoder(Box::new(EchoDecoder::new())).unwrap();
    // Equivalent to start(0) followed by seek(200000) before any pop: the
    // seek slot is populated before the reader thread exists either way.
    controller.start(200_000).unwrap();

    let first = controller.pop_frame().unwrap();
    assert_eq!(first.pts_micros, 200_000);
}

#[test]
fn s3_coalesced_seeks_reach_the_source_exactly_once() {
    let controller = PipelineController::alloc(DecoderOptions::default()).unwrap();
    let source = VecSource::new(vec![], false);
    let seeks = source.seeks_handle();
    controller.register_source(Box::new(source)).unwrap();
    controller.register_decoder(Box::new(EchoDecoder::new())).unwrap();

    controller.seek(100_000);
    controller.seek(500_000);
    controller.seek(300_000);
    controller.start(0).unwrap();

    assert!(matches!(controller.pop_frame(), Err(PipelineError::Eof)));
    assert_eq!(*seeks.lock().unwrap(), vec![300_000]);
}

#[test]
fn s4_pre_seek_fallback_emits_the_cached_frame_then_the_post_seek_frame() {
    // Source never relocates on seek (no keyframe anywhere near the
    // target), so every packet still reaches the decoder after SEEK(250000)
    // lands. Per the emission algorithm, frames before the target are
    // cached (each replacing the last), and once the qualifying frame
    // arrives, any cached frame is emitted first, unmodified. The pts
    // rewrite only fires when nothing was cached.
    let controller = PipelineController::alloc(DecoderOptions::default()).unwrap();
    controller
        .register_source(Box::new(VecSource::new(vec![0, 100_000, 200_000, 300_000], false)))
        .unwrap();
    controller.register_decoder(Box::new(EchoDecoder::new())).unwrap();
    controller.start(250_000).unwrap();

    assert_eq!(controller.pop_frame().unwrap().pts_micros, 200_000);
    assert_eq!(controller.pop_frame().unwrap().pts_micros, 300_000);
    assert!(matches!(controller.pop_frame(), Err(PipelineError::Eof)));
}

#[test]
fn s5_trim_filterer_signals_eof_past_max_pts() {
    let controller = PipelineController::alloc(DecoderOptions::default()).unwrap();
    controller.register_source(Box::new(VecSource::new(ten_frame_pts(), false))).unwrap();
    controller.register_decoder(Box::new(EchoDecoder::new())).unwrap();
    controller.register_filterer(Box::new(TrimFilterer::new(120_000))).unwrap();
    controller.start(0).unwrap();

    for expected in [0, 40_000, 80_000, 120_000] {
        let frame = controller.pop_frame().unwrap();
        assert_eq!(frame.pts_micros, expected);
    }
    assert!(matches!(controller.pop_frame(), Err(PipelineError::Eof)));
}

#[test]
fn s6_stop_mid_stream_is_graceful_and_final() {
    let controller = PipelineController::alloc(DecoderOptions::default()).unwrap();
    let many_frames: Vec<i64> = (0..10_000).map(|i| i * 40_000).collect();
    controller.register_source(Box::new(VecSource::new(many_frames, false))).unwrap();
    controller.register_decoder(Box::new(EchoDecoder::new())).unwrap();
    controller.start(0).unwrap();

    for _ in 0..3 {
        controller.pop_frame().unwrap();
    }

    controller.stop();
    controller.wait();

    assert!(matches!(controller.pop_frame(), Err(PipelineError::Eof)));
}
