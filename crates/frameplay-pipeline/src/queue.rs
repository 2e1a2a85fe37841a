// crates/frameplay-pipeline/src/queue.rs
//
// MessageQueue<T>: bounded FIFO with blocking send/recv, non-blocking
// flush, and independent poisoning of the send and recv directions
// (spec §3, §6). Grounded on async.c's use of AVThreadMessageQueue
// (av_thread_message_queue_alloc/send/recv/flush/set_err_send/
// set_err_recv) throughout reader_thread/decoder_thread/async_stop.
//
// Direction semantics, matching the C queue exactly:
//   * `set_err_send(code)` declares "no more items will be produced".
//     Future `send()` calls reject immediately with `code`. `recv()`
//     keeps draining whatever is already queued, and only returns `code`
//     once the queue is empty — this is how EOF/errors flow *downstream*.
//   * `set_err_recv(code)` declares "nobody will consume any more".
//     Future `recv()` calls reject immediately with `code`, and so do
//     future `send()` calls (no point queuing for a consumer that is
//     gone) — this is how shutdown signals flow *upstream* to unblock a
//     blocked producer.
//
// `flush()` drops every queued item immediately. The spec calls this "a
// per-element destructor call" (the C implementation needs one because it
// manages memory manually); in Rust, the destructor *is* whatever `Drop`
// impl T provides — dropping the VecDeque's contents on flush achieves
// exactly that, so no separate destructor callback is threaded through.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

use frameplay_core::PipelineError;

struct State<T> {
    items: VecDeque<T>,
    err_send: Option<PipelineError>,
    err_recv: Option<PipelineError>,
}

pub struct MessageQueue<T> {
    capacity: usize,
    state: Mutex<State<T>>,
    not_full: Condvar,
    not_empty: Condvar,
}

impl<T> MessageQueue<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be positive");
        Self {
            capacity,
            state: Mutex::new(State {
                items: VecDeque::with_capacity(capacity),
                err_send: None,
                err_recv: None,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of queued items. For tests and invariant checks
    /// (spec §8 invariant 1: size always in [0, capacity]).
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Blocking send. Fails immediately if recv is poisoned, or if send is
    /// already poisoned; otherwise blocks while the queue is full.
    pub fn send(&self, item: T) -> Result<(), PipelineError> {
        let mut state = self.state.lock().unwrap();
        loop {
            if let Some(err) = &state.err_recv {
                return Err(err.clone());
            }
            if let Some(err) = &state.err_send {
                return Err(err.clone());
            }
            if state.items.len() < self.capacity {
                state.items.push_back(item);
                self.not_empty.notify_one();
                return Ok(());
            }
            state = self.not_full.wait(state).unwrap();
        }
    }

    /// Blocking recv. Always drains whatever is already queued first,
    /// regardless of poison state — a forward EOF/error must not discard
    /// packets that were already pulled before the source stopped. Only
    /// once the queue is empty does recv report the poison code, checking
    /// send-poison (the normal forward EOS path) before recv-poison (the
    /// degenerate case of a queue recv'd from after it poisoned itself).
    pub fn recv(&self) -> Result<T, PipelineError> {
        let mut state = self.state.lock().unwrap();
        loop {
            if let Some(item) = state.items.pop_front() {
                self.not_full.notify_one();
                return Ok(item);
            }
            if let Some(err) = &state.err_send {
                return Err(err.clone());
            }
            if let Some(err) = &state.err_recv {
                return Err(err.clone());
            }
            state = self.not_empty.wait(state).unwrap();
        }
    }

    /// Drop every queued item without touching poison state (spec §3:
    /// "flush drops all queued items ... without affecting poison state").
    pub fn flush(&self) {
        let mut state = self.state.lock().unwrap();
        state.items.clear();
        self.not_full.notify_all();
    }

    /// Poison the send direction with `err` (sticky — first caller wins).
    /// Wakes every waiter so blocked recv()s can observe the drained queue
    /// and blocked send()s can observe the rejection.
    pub fn set_err_send(&self, err: PipelineError) {
        let mut state = self.state.lock().unwrap();
        state.err_send.get_or_insert(err);
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    /// Poison the recv direction with `err` (sticky — first caller wins).
    pub fn set_err_recv(&self, err: PipelineError) {
        let mut state = self.state.lock().unwrap();
        state.err_recv.get_or_insert(err);
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    pub fn err_send(&self) -> Option<PipelineError> {
        self.state.lock().unwrap().err_send.clone()
    }

    pub fn err_recv(&self) -> Option<PipelineError> {
        self.state.lock().unwrap().err_recv.clone()
    }
}
