// crates/frameplay-pipeline/src/filterer.rs
//
// The filter stage (spec §4.5): the last concurrent stage before frames
// reach the host via `PipelineController::pop_frame`. Grounded on async.c's
// filterer_thread, which is a thin loop around a single collaborator
// callback — no reordering, no seek-awareness, just pull/transform/push.
//
// async.c's filterer_thread body:
//   while (1) {
//       recv frame_queue -> f
//       if f == NULL: push empty frame to sink_queue, break
//       filter_cb(f) -> filtered frame(s), pushed to sink_queue
//   }
//   filterer_uninit(); set_err_send(frame_queue); set_err_recv(sink_queue)
//   (the filterer is frame_queue's consumer and sink_queue's producer, so
//   these mirror decoder_thread's own pair of calls on pkt_queue/frame_queue)

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use frameplay_core::{Frame, PipelineError};

use crate::queue::MessageQueue;

/// The filter collaborator (spec §4.5, §6's filterer vtable). A no-op
/// passthrough and a simple trim are provided below as the concrete
/// implementations a host can plug in without writing its own.
pub trait Filterer: Send {
    fn init(&mut self) -> Result<(), PipelineError> {
        Ok(())
    }

    /// Transform one frame into zero or more output frames. Called only on
    /// the filterer thread.
    fn filter(&mut self, frame: Frame) -> Result<Vec<Frame>, PipelineError>;

    fn uninit(&mut self) {}
}

pub fn spawn(
    frame_queue: Arc<MessageQueue<Frame>>,
    sink_queue: Arc<MessageQueue<Frame>>,
    filterer: Box<dyn Filterer>,
) -> JoinHandle<()> {
    thread::spawn(move || run(frame_queue, sink_queue, filterer))
}

fn run(frame_queue: Arc<MessageQueue<Frame>>, sink_queue: Arc<MessageQueue<Frame>>, mut filterer: Box<dyn Filterer>) {
    if let Err(err) = filterer.init() {
        eprintln!("[filter] init failed: {err:?}");
        frame_queue.set_err_recv(err.clone());
        sink_queue.set_err_send(err);
        return;
    }

    let exit_err = loop {
        match frame_queue.recv() {
            Ok(frame) => match filterer.filter(frame) {
                Ok(filtered) => {
                    let mut sent_err = None;
                    for out in filtered {
                        if let Err(err) = sink_queue.send(out) {
                            sent_err = Some(err);
                            break;
                        }
                    }
                    if let Some(err) = sent_err {
                        break err;
                    }
                }
                Err(err) => break err,
            },
            Err(err) => break err,
        }
    };

    filterer.uninit();
    // filterer is frame_queue's consumer (mirrors decoder's own teardown
    // call on pkt_queue) and sink_queue's producer (mirrors reader's and
    // decoder's set_err_recv calls on their respective output queues).
    frame_queue.set_err_send(exit_err.clone());
    sink_queue.set_err_recv(exit_err);
}

/// Passes every frame through untouched. The default filterer when a host
/// registers none.
pub struct PassthroughFilterer;

impl Filterer for PassthroughFilterer {
    fn filter(&mut self, frame: Frame) -> Result<Vec<Frame>, PipelineError> {
        Ok(vec![frame])
    }
}

/// Passes frames through until `pts_micros` exceeds `max_pts`, then signals
/// EOF upstream instead of emitting anything further. A minimal, realistic
/// example of a filterer that narrows rather than merely relays — the
/// trim_duration half of `register_filterer(filter_string, trim_duration)`.
pub struct TrimFilterer {
    max_pts: i64,
}

impl TrimFilterer {
    pub fn new(max_pts: i64) -> Self {
        Self { max_pts }
    }
}

impl Filterer for TrimFilterer {
    fn filter(&mut self, frame: Frame) -> Result<Vec<Frame>, PipelineError> {
        if frame.pts_micros > self.max_pts {
            Err(PipelineError::Eof)
        } else {
            Ok(vec![frame])
        }
    }
}
