// crates/frameplay-pipeline/src/decoder_stage.rs
//
// The decoder stage (spec §4.3): owns the packet->frame transition, the
// seek-aware emission cache, and the thread that drives it.
//
// Grounded on async.c's decoder_thread (packet loop, SEEK handling, and the
// drain-on-teardown sequence) and async_queue_frame/queue_frame/
// queue_cached_frame (the cached-frame-and-pts-rewrite emission logic).

use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use frameplay_core::{Frame, PipelineError, PipelineMessage};

use crate::decoder_trait::{Decoder, FrameSink};
use crate::filterer::{self, Filterer};
use crate::queue::MessageQueue;

struct EmitState {
    /// Set while a seek to this timestamp is in flight; cleared the moment
    /// the first frame is emitted after the seek lands (spec §4.3).
    seek_request: Option<i64>,
    /// The most recent frame seen whose pts is still before `seek_request`
    /// — kept around so it can be re-emitted right before the first
    /// genuinely post-seek frame, in case the target lands in a gap with
    /// no decodable frame at or after it (spec §4.3 "pre-seek fallback").
    cached_frame: Option<Frame>,
}

/// Owns the seek-aware caching/rewrite logic that sits between a `Decoder`
/// and the frame `MessageQueue` (spec §4.3). Implements `FrameSink` so any
/// `Decoder`, synchronous or not, can emit through it uniformly.
pub struct SeekAwareSink {
    frame_queue: Arc<MessageQueue<Frame>>,
    state: Mutex<EmitState>,
}

impl SeekAwareSink {
    pub fn new(frame_queue: Arc<MessageQueue<Frame>>) -> Self {
        Self {
            frame_queue,
            state: Mutex::new(EmitState { seek_request: None, cached_frame: None }),
        }
    }

    /// Called by the decoder stage loop when a `Seek` message arrives,
    /// before the corresponding packets are pushed to the decoder. `None`
    /// clears an in-flight request (nothing to clear in practice once a
    /// frame lands, but exposed for the teardown path).
    pub fn set_seek_request(&self, ts_micros: Option<i64>) {
        self.state.lock().unwrap().seek_request = ts_micros;
    }

    fn send_frame(&self, frame: Frame) -> Result<(), PipelineError> {
        self.frame_queue.send(frame).map_err(|err| {
            self.frame_queue.set_err_recv(err.clone());
            err
        })
    }
}

impl FrameSink for SeekAwareSink {
    fn emit(&self, frame: Option<Frame>) -> Result<(), PipelineError> {
        let Some(mut frame) = frame else {
            let cached = self.state.lock().unwrap().cached_frame.take();
            if let Some(cached) = cached {
                self.send_frame(cached)?;
            }
            return Err(PipelineError::Eof);
        };

        let cached = {
            let mut state = self.state.lock().unwrap();
            if let Some(target) = state.seek_request {
                if frame.pts_micros < target {
                    // Still before the seek target: cache and swallow it,
                    // replacing whatever was cached before.
                    state.cached_frame = Some(frame);
                    return Ok(());
                }
            }
            let cached = state.cached_frame.take();
            if cached.is_none() {
                if let Some(target) = state.seek_request {
                    if target > 0 && frame.pts_micros > target {
                        frame.set_pts_micros(target);
                    }
                }
            }
            state.seek_request = None;
            cached
        };

        if let Some(cached) = cached {
            self.send_frame(cached)?;
        }
        self.send_frame(frame)
    }
}

pub struct DecoderStageParams {
    pub pkt_queue: Arc<MessageQueue<PipelineMessage>>,
    pub frame_queue: Arc<MessageQueue<Frame>>,
    pub sink_queue: Arc<MessageQueue<Frame>>,
    pub decoder: Box<dyn Decoder>,
    pub filterer: Box<dyn Filterer>,
}

/// Spawn the decoder stage thread. Owns the decoder and the sub-filterer
/// thread for its whole lifetime; returns once the packet queue is
/// exhausted or poisoned and the filterer thread has been joined.
pub fn spawn(params: DecoderStageParams) -> JoinHandle<()> {
    thread::spawn(move || run(params))
}

fn run(params: DecoderStageParams) {
    let DecoderStageParams { pkt_queue, frame_queue, sink_queue, mut decoder, filterer } = params;

    let sink = Arc::new(SeekAwareSink::new(frame_queue.clone()));
    if let Err(err) = decoder.init(sink.clone()) {
        eprintln!("[decoder] init failed: {err:?}");
        frame_queue.set_err_recv(err);
        return;
    }

    let filterer_handle = filterer::spawn(frame_queue.clone(), sink_queue, filterer);

    let exit_err = loop {
        match pkt_queue.recv() {
            Ok(PipelineMessage::Data(pkt)) => {
                if let Err(err) = decoder.push_packet(&pkt) {
                    break err;
                }
            }
            Ok(PipelineMessage::Seek(ts)) => {
                // Drain whatever the decoder had buffered under the old
                // timeline *before* the seek target takes effect — those
                // frames are not pre/post-seek, they are simply leftovers
                // from before the cut and get discarded wholesale next.
                decoder.flush();
                frame_queue.flush();
                sink.set_seek_request(Some(ts));
            }
            Err(err) => break err,
        }
    };

    // Teardown: let the decoder drain anything it's still holding, then
    // shut it down and propagate the terminal code downstream.
    decoder.flush();
    decoder.uninit();
    frame_queue.set_err_recv(exit_err.clone());
    pkt_queue.set_err_send(exit_err);

    let _ = filterer_handle.join();
}

#[cfg(test)]
mod tests {
    use super::*;
    use frameplay_core::TimeBase;

    fn frame_at(pts_micros: i64) -> Frame {
        Frame::cpu(pts_micros, 4, 4, vec![0; 16])
    }

    #[test]
    fn pre_seek_frames_are_cached_and_swallowed() {
        let q = Arc::new(MessageQueue::new(4));
        let sink = SeekAwareSink::new(q.clone());
        sink.set_seek_request(Some(1_000_000));
        sink.emit(Some(frame_at(200_000))).unwrap();
        sink.emit(Some(frame_at(500_000))).unwrap();
        assert_eq!(q.len(), 0, "pre-seek frames must not reach the queue yet");
    }

    #[test]
    fn cached_frame_flushes_right_before_first_post_seek_frame() {
        let q = Arc::new(MessageQueue::new(4));
        let sink = SeekAwareSink::new(q.clone());
        sink.set_seek_request(Some(1_000_000));
        sink.emit(Some(frame_at(500_000))).unwrap();
        sink.emit(Some(frame_at(1_200_000))).unwrap();

        assert_eq!(q.recv().unwrap().pts_micros, 500_000);
        assert_eq!(q.recv().unwrap().pts_micros, 1_200_000);
    }

    #[test]
    fn first_post_seek_frame_is_rewritten_down_when_nothing_cached() {
        let q = Arc::new(MessageQueue::new(4));
        let sink = SeekAwareSink::new(q.clone());
        sink.set_seek_request(Some(1_000_000));
        sink.emit(Some(frame_at(1_400_000))).unwrap();

        assert_eq!(q.recv().unwrap().pts_micros, 1_000_000);
    }

    #[test]
    fn seek_request_clears_after_first_post_seek_emission() {
        let q = Arc::new(MessageQueue::new(4));
        let sink = SeekAwareSink::new(q.clone());
        sink.set_seek_request(Some(1_000_000));
        sink.emit(Some(frame_at(1_400_000))).unwrap();
        // Subsequent frames are untouched even though their pts is still
        // "close" to the old target — the request already fired.
        sink.emit(Some(frame_at(900_000))).unwrap();
        let _ = q.recv().unwrap(); // the rewritten 1_000_000 one
        assert_eq!(q.recv().unwrap().pts_micros, 900_000);
    }

    #[test]
    fn null_frame_flushes_cache_then_reports_eof() {
        let q = Arc::new(MessageQueue::new(4));
        let sink = SeekAwareSink::new(q.clone());
        sink.set_seek_request(Some(1_000_000));
        sink.emit(Some(frame_at(200_000))).unwrap();
        let result = sink.emit(None);
        assert!(matches!(result, Err(PipelineError::Eof)));
        assert_eq!(q.recv().unwrap().pts_micros, 200_000);
    }

    #[test]
    fn no_seek_in_flight_passes_frames_through_unchanged() {
        let q = Arc::new(MessageQueue::new(4));
        let sink = SeekAwareSink::new(q.clone());
        sink.emit(Some(frame_at(1))).unwrap();
        sink.emit(Some(frame_at(2))).unwrap();
        assert_eq!(q.recv().unwrap().pts_micros, 1);
        assert_eq!(q.recv().unwrap().pts_micros, 2);
    }

    #[test]
    fn pts_never_decreases_across_a_seek_free_run() {
        let q = Arc::new(MessageQueue::new(64));
        let sink = SeekAwareSink::new(q.clone());
        let pts_values: Vec<i64> = (0..50).map(|i| i * 40_000).collect();
        for &pts in &pts_values {
            sink.emit(Some(frame_at(pts))).unwrap();
        }

        let mut last = i64::MIN;
        for _ in &pts_values {
            let pts = q.recv().unwrap().pts_micros;
            assert!(pts >= last, "pts went backwards: {last} then {pts}");
            last = pts;
        }
    }

    #[test]
    fn timebase_is_available_for_host_decoders_rescaling_into_this_sink() {
        // Sanity check that the crate's rescale helper composes cleanly
        // with pts values flowing into emit() — decoders are expected to
        // rescale into microseconds themselves before calling emit.
        let tb = TimeBase::new(1, 25);
        assert_eq!(tb.to_micros(1), 40_000);
    }
}
