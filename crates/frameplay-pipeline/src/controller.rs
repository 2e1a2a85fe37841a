// crates/frameplay-pipeline/src/controller.rs
//
// PipelineController (spec §4.1): the public entry point a host drives —
// register collaborators, start, seek, pop frames, stop. Grounded on
// async.c's async_context + async_alloc/start/wait/stop/pop_frame/
// started/free, with the registration step split into three explicit
// register_* calls (spec §6) rather than one struct literal of callbacks,
// and on velocut-media::worker::MediaWorker for the Arc<AtomicBool>
// shutdown-flag idiom used for `is_running`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use frameplay_core::{DecoderOptions, Frame, PipelineError, SINK_QUEUE_CAPACITY};

use crate::decoder_trait::Decoder;
use crate::filterer::{Filterer, PassthroughFilterer};
use crate::queue::MessageQueue;
use crate::reader::{self, ReaderStageParams};
use crate::seek_channel::SeekChannel;
use crate::source::PacketSource;

enum State {
    /// Collaborators are being registered; nothing is running yet.
    Idle { source: Option<Box<dyn PacketSource>>, decoder: Option<Box<dyn Decoder>>, filterer: Box<dyn Filterer> },
    /// The reader/decoder/filterer threads are up.
    Running { sink_queue: Arc<MessageQueue<Frame>>, handle: JoinHandle<()> },
    /// `stop`/`wait` has already run; the controller is inert.
    Stopped,
}

/// Ties the three pipeline stages together behind a small imperative API
/// (spec §4.1). One controller drives exactly one decode session; start a
/// fresh one for a new source.
pub struct PipelineController {
    options: DecoderOptions,
    state: Mutex<State>,
    seek_channel: Arc<SeekChannel>,
    running: Arc<AtomicBool>,
}

impl PipelineController {
    /// Allocate a controller with the given queue-capacity options (spec
    /// §4.1 `alloc`). No collaborators are registered and no threads run
    /// yet.
    pub fn alloc(options: DecoderOptions) -> Result<Self, PipelineError> {
        options.validate()?;
        Ok(Self {
            options,
            state: Mutex::new(State::Idle {
                source: None,
                decoder: None,
                filterer: Box::new(PassthroughFilterer),
            }),
            seek_channel: Arc::new(SeekChannel::new()),
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Register the packet source. Must be called before `start`.
    pub fn register_source(&self, source: Box<dyn PacketSource>) -> Result<(), PipelineError> {
        match &mut *self.state.lock().unwrap() {
            State::Idle { source: slot, .. } => {
                *slot = Some(source);
                Ok(())
            }
            _ => Err(PipelineError::Invariant("register_source called after start")),
        }
    }

    /// Register the decoder. Must be called before `start`.
    pub fn register_decoder(&self, decoder: Box<dyn Decoder>) -> Result<(), PipelineError> {
        match &mut *self.state.lock().unwrap() {
            State::Idle { decoder: slot, .. } => {
                *slot = Some(decoder);
                Ok(())
            }
            _ => Err(PipelineError::Invariant("register_decoder called after start")),
        }
    }

    /// Register the filterer. Optional — defaults to a passthrough if
    /// never called. Must be called before `start`.
    pub fn register_filterer(&self, filterer: Box<dyn Filterer>) -> Result<(), PipelineError> {
        match &mut *self.state.lock().unwrap() {
            State::Idle { filterer: slot, .. } => {
                *slot = filterer;
                Ok(())
            }
            _ => Err(PipelineError::Invariant("register_filterer called after start")),
        }
    }

    /// Start the pipeline. `skip_ts` positions playback before the first
    /// packet is pulled, exactly like passing a start offset to
    /// `async_start` (spec §4.1, §4.2).
    pub fn start(&self, skip_ts: i64) -> Result<(), PipelineError> {
        let mut state = self.state.lock().unwrap();
        let (source, decoder, filterer) = match std::mem::replace(&mut *state, State::Stopped) {
            State::Idle { source: Some(source), decoder: Some(decoder), filterer } => {
                (source, decoder, filterer)
            }
            other => {
                *state = other;
                return Err(PipelineError::Invariant("start called without a registered source/decoder"));
            }
        };

        if skip_ts != 0 {
            self.seek_channel.request(skip_ts);
        }

        let pkt_queue = Arc::new(MessageQueue::new(self.options.max_packets_queue));
        let frame_queue = Arc::new(MessageQueue::new(self.options.max_frames_queue));
        let sink_queue = Arc::new(MessageQueue::new(SINK_QUEUE_CAPACITY));

        self.running.store(true, Ordering::SeqCst);
        let running = self.running.clone();
        let seek_channel = self.seek_channel.clone();
        let sink_queue_for_thread = sink_queue.clone();

        let handle = std::thread::Builder::new()
            .name("frameplay-reader".into())
            .spawn(move || {
                reader::run(ReaderStageParams {
                    pkt_queue,
                    frame_queue,
                    sink_queue: sink_queue_for_thread,
                    source,
                    decoder,
                    filterer,
                    seek_channel,
                });
                running.store(false, Ordering::SeqCst);
            })
            .expect("failed to spawn reader thread");

        *state = State::Running { sink_queue, handle };
        Ok(())
    }

    /// Request a seek to `ts_micros`. Coalesces with any not-yet-observed
    /// prior request (spec §8 invariant 9). Non-blocking.
    pub fn seek(&self, ts_micros: i64) {
        self.seek_channel.request(ts_micros);
    }

    /// Pop the next decoded, filtered frame, blocking until one is ready.
    /// Returns `Err(PipelineError::Eof)` once the pipeline has run
    /// through its terminal teardown and drained the sink queue.
    pub fn pop_frame(&self) -> Result<Frame, PipelineError> {
        match &*self.state.lock().unwrap() {
            State::Running { sink_queue, .. } => sink_queue.recv(),
            State::Idle { .. } => Err(PipelineError::Invariant("pop_frame called before start")),
            State::Stopped => Err(PipelineError::Eof),
        }
    }

    /// `true` once `start` has been called and the reader thread has not
    /// yet reported completion (spec §4.1 `is_running`).
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop the pipeline: poisons the sink queue's send direction (spec §5:
    /// "stop poisons the sink (send direction → EOF) so the filterer's next
    /// emission fails"), flushes it to unblock a producer already sitting
    /// on a full queue, then joins every thread and releases the queues.
    /// Safe to call before `start` (no-op) and safe to call more than once.
    pub fn stop(&self) {
        if let State::Running { sink_queue, .. } = &*self.state.lock().unwrap() {
            sink_queue.set_err_send(PipelineError::Eof);
            sink_queue.flush();
        }
        self.join();
    }

    /// Block until every pipeline thread has exited, without poisoning the
    /// sink queue first — `stop` minus the pre-poison. For a consumer that
    /// wants the pipeline to run to its own natural EOF (source exhausted,
    /// decoder/filterer unwinding on their own) and only then reclaim the
    /// thread, rather than cutting it off early.
    pub fn wait(&self) {
        self.join();
    }

    fn join(&self) {
        let state = std::mem::replace(&mut *self.state.lock().unwrap(), State::Stopped);
        if let State::Running { handle, .. } = state {
            let _ = handle.join();
        }
    }
}

impl Drop for PipelineController {
    fn drop(&mut self) {
        self.stop();
    }
}
