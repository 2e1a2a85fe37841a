// crates/frameplay-pipeline/src/reorder.rs
//
// The reordering, credit-managed decoder variant (spec §4.4), grounded
// near-verbatim on decoder_vt.c: struct async_frame (the reorder node),
// struct bufcount_context (the credit manager), vtdec_context's
// nb_queued/lock/cond gate, decode_callback's insertion-sort-with-
// supersession, vtdec_push_packet's backpressure wait, and vtdec_flush's
// drain sequence.
//
// There is no real platform decoder to call into here (no VideoToolbox,
// no hardware session) — `ReorderingDecoder` is generic over anything that
// can accept a packet and eventually produce a pts-stamped image
// asynchronously, via the `AsyncImageSource` trait below. This is the seam
// a host plugs a real hardware decoder into; the reordering, credit
// accounting and backpressure gating are this module's actual payload and
// are exactly decoder_vt.c's algorithm, not a platform binding.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};

use frameplay_core::{Frame, ManagedImage, Packet, PipelineError};

use crate::decoder_trait::{Decoder, FrameSink};

/// Hard cap on packets in flight with the hardware session at once
/// (decoder_vt.c's `nb_queued >= 3` gate in `vtdec_push_packet`).
const MAX_QUEUED: u32 = 3;

/// A platform decode session that accepts packets and reports decoded
/// images out of order, asynchronously, via `on_image`/`on_error`. Stands
/// in for VTDecompressionSessionDecodeFrame + its completion callback.
pub trait AsyncImageSource: Send {
    fn submit(
        &mut self,
        pkt: &Packet,
        on_image: Arc<dyn Fn(i64, ManagedImage) + Send + Sync>,
        on_error: Arc<dyn Fn() + Send + Sync>,
    ) -> Result<(), PipelineError>;

    /// Block until every submitted-but-not-yet-completed decode finishes
    /// calling back (decoder_vt.c's `vtdec_flush`'s
    /// `VTDecompressionSessionWaitForAsynchronousFrames`).
    fn wait_idle(&mut self);
}

/// Insertion-sorted queue of *completed* decode-order nodes, ascending by
/// pts (decoder_vt.c's `struct async_frame` linked list). There is no
/// separate bookkeeping for still-in-flight submissions — `nb_queued`
/// alone bounds how far ahead decoding can race, and that bound is what
/// makes the supersession rule below safe.
struct ReorderQueue {
    nodes: VecDeque<(i64, ManagedImage)>,
}

impl ReorderQueue {
    fn new() -> Self {
        Self { nodes: VecDeque::new() }
    }

    /// Splice a newly completed `(pts, image)` into presentation order.
    /// Every node it lands strictly past (pts < the new one) has been
    /// superseded — nothing still in flight can have an earlier pts than
    /// something that just arrived later, so it's safe to release them
    /// now rather than wait for their own "turn" at the front (decode_
    /// callback's insertion-sort-with-supersession).
    fn insert(&mut self, pts: i64, image: ManagedImage) -> Vec<(i64, ManagedImage)> {
        let split = self.nodes.iter().position(|(p, _)| *p >= pts).unwrap_or(self.nodes.len());
        let superseded: Vec<_> = self.nodes.drain(..split).collect();
        self.nodes.push_front((pts, image));
        superseded
    }

    /// Drain everything left, in presentation order (flush/uninit).
    fn drain_all(&mut self) -> Vec<(i64, ManagedImage)> {
        self.nodes.drain(..).collect()
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// `(refcount, refmax)` under a mutex+condvar, acting as a dynamically
/// resizable counting semaphore over in-flight platform buffers
/// (decoder_vt.c's `struct bufcount_context`). `refcount` starts at 1 (the
/// decoder context's own reference); the manager conceptually
/// self-destructs once it reaches 0 — modeled here as simply becoming
/// permanently idle, since Rust drops the allocation for us regardless.
pub struct CreditManager {
    state: Mutex<(u32, u32)>,
    cond: Condvar,
}

impl CreditManager {
    pub fn new(refmax: u32) -> Arc<Self> {
        Arc::new(Self { state: Mutex::new((1, refmax)), cond: Condvar::new() })
    }

    /// `refmax += delta` (spec §4.4: one call per reorder-queue
    /// insertion/eviction, `+1` on insert, `-1` on each superseded
    /// eviction), then wake anyone waiting on `update_ref`.
    pub fn update_max(&self, delta: i32) {
        let mut state = self.state.lock().unwrap();
        state.1 = (state.1 as i32 + delta).max(0) as u32;
        self.cond.notify_all();
    }

    /// `+1`: register a new outstanding image, blocking while
    /// `refcount >= refmax` (the platform is back-pressured until a
    /// downstream consumer releases one). `-1`: release one; if that
    /// drops `refcount` to zero, the manager is considered destroyed.
    pub fn update_ref(&self, delta: i32) {
        let mut state = self.state.lock().unwrap();
        if delta > 0 {
            state.0 += delta as u32;
            while state.0 >= state.1 {
                state = self.cond.wait(state).unwrap();
            }
        } else {
            state.0 = state.0.saturating_sub((-delta) as u32);
            self.cond.notify_all();
        }
    }

    pub fn refcount(&self) -> u32 {
        self.state.lock().unwrap().0
    }

    pub fn refmax(&self) -> u32 {
        self.state.lock().unwrap().1
    }
}

struct Shared {
    reorder: Mutex<ReorderQueue>,
    nb_queued: Mutex<u32>,
    cond: Condvar,
    sink: Mutex<Option<Arc<dyn FrameSink>>>,
    credits: Arc<CreditManager>,
}

impl Shared {
    fn emit(&self, pts_micros: i64, image: ManagedImage) {
        if let Some(sink) = self.sink.lock().unwrap().as_ref() {
            let frame = Frame::managed(pts_micros, 0, 0, image);
            let _ = sink.emit(Some(frame));
        }
    }
}

/// The reordering, credit-managed `Decoder` implementation (spec §4.4).
pub struct ReorderingDecoder {
    source: Box<dyn AsyncImageSource>,
    shared: Arc<Shared>,
}

impl ReorderingDecoder {
    pub fn new(source: Box<dyn AsyncImageSource>) -> Self {
        Self {
            source,
            shared: Arc::new(Shared {
                reorder: Mutex::new(ReorderQueue::new()),
                nb_queued: Mutex::new(0),
                cond: Condvar::new(),
                sink: Mutex::new(None),
                credits: CreditManager::new(MAX_QUEUED + 1),
            }),
        }
    }

    pub fn credits(&self) -> Arc<CreditManager> {
        self.shared.credits.clone()
    }
}

impl Decoder for ReorderingDecoder {
    fn init(&mut self, sink: Arc<dyn FrameSink>) -> Result<(), PipelineError> {
        *self.shared.sink.lock().unwrap() = Some(sink);
        Ok(())
    }

    fn push_packet(&mut self, pkt: &Packet) -> Result<(), PipelineError> {
        if pkt.is_empty() {
            self.flush();
            return Err(PipelineError::Eof);
        }

        {
            let mut nb_queued = self.shared.nb_queued.lock().unwrap();
            while *nb_queued >= MAX_QUEUED {
                nb_queued = self.shared.cond.wait(nb_queued).unwrap();
            }
            *nb_queued += 1;
        }

        let shared_ok = self.shared.clone();
        let shared_err = self.shared.clone();
        let credits = self.shared.credits.clone();

        let on_image = Arc::new(move |pts: i64, image: ManagedImage| {
            credits.update_max(1);
            let superseded = shared_ok.reorder.lock().unwrap().insert(pts, image);
            let evicted = superseded.len() as i32;
            {
                let mut nb_queued = shared_ok.nb_queued.lock().unwrap();
                *nb_queued = nb_queued.saturating_sub(1);
                shared_ok.cond.notify_all();
            }
            if evicted > 0 {
                credits.update_max(-evicted);
            }
            credits.update_ref(1);
            for (pts, image) in superseded {
                shared_ok.emit(pts, image);
            }
        });
        let on_error = Arc::new(move || {
            // Submission failure: the packet never produced an image.
            // decoder_vt.c resets nb_queued to 0 and signals, treating
            // this as if the whole in-flight batch drained at once
            // rather than trying to track which specific slot failed.
            eprintln!("[credit] async submission failed, resetting nb_queued to 0");
            *shared_err.nb_queued.lock().unwrap() = 0;
            shared_err.cond.notify_all();
        });

        if let Err(err) = self.source.submit(pkt, on_image, on_error) {
            eprintln!("[credit] submit returned {err:?}, resetting nb_queued to 0");
            *self.shared.nb_queued.lock().unwrap() = 0;
            self.shared.cond.notify_all();
            return Err(err);
        }

        Ok(())
    }

    fn flush(&mut self) {
        self.source.wait_idle();
        {
            let nb_queued = self.shared.nb_queued.lock().unwrap();
            let _unused = self.shared.cond.wait_while(nb_queued, |n| *n != 0).unwrap();
        }
        let remaining = self.shared.reorder.lock().unwrap().drain_all();
        let count = remaining.len() as i32;
        for (pts, image) in remaining {
            self.shared.emit(pts, image);
        }
        if count > 0 {
            self.shared.credits.update_max(-count);
        }
        if let Some(sink) = self.shared.sink.lock().unwrap().as_ref() {
            let _ = sink.emit(None);
        }
    }

    fn uninit(&mut self) {
        let discarded = self.shared.reorder.lock().unwrap().drain_all();
        let count = discarded.len() as i32;
        drop(discarded); // releases each ManagedImage's release hook
        if count > 0 {
            self.shared.credits.update_max(-count);
        }
        *self.shared.sink.lock().unwrap() = None;
        self.shared.credits.update_ref(-1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct RecordingSink {
        seen: Mutex<Vec<i64>>,
        eof: AtomicBool,
    }

    impl FrameSink for RecordingSink {
        fn emit(&self, frame: Option<Frame>) -> Result<(), PipelineError> {
            match frame {
                Some(f) => {
                    self.seen.lock().unwrap().push(f.pts_micros);
                    Ok(())
                }
                None => {
                    self.eof.store(true, Ordering::SeqCst);
                    Err(PipelineError::Eof)
                }
            }
        }
    }

    #[test]
    fn out_of_order_completions_supersede_earlier_pending_nodes() {
        // Mirrors spec §8's S5: decode-order completions 0, 40000, 120000,
        // 80000, 200000, 160000 must yield presentation order
        // 0, 40000, 80000, 120000, 160000, 200000 once the tail is drained.
        let mut q = ReorderQueue::new();
        let mut emitted = Vec::new();

        for pts in [0, 40_000, 120_000, 80_000, 200_000, 160_000] {
            let superseded = q.insert(pts, ManagedImage::new(pts as u64, || {}));
            emitted.extend(superseded.into_iter().map(|(p, _)| p));
        }
        emitted.extend(q.drain_all().into_iter().map(|(p, _)| p));

        assert_eq!(emitted, vec![0, 40_000, 80_000, 120_000, 160_000, 200_000]);
    }

    #[test]
    fn credit_manager_tracks_refcount_and_refmax() {
        let mgr = CreditManager::new(4);
        assert_eq!(mgr.refcount(), 1);
        mgr.update_ref(-1);
        assert_eq!(mgr.refcount(), 0);

        mgr.update_max(2);
        assert_eq!(mgr.refmax(), 6);
        mgr.update_ref(1);
        assert_eq!(mgr.refcount(), 1);
    }

    struct ImmediateSource {
        sink: Arc<Mutex<Vec<(i64, Arc<dyn Fn(i64, ManagedImage) + Send + Sync>)>>>,
    }

    impl AsyncImageSource for ImmediateSource {
        fn submit(
            &mut self,
            pkt: &Packet,
            on_image: Arc<dyn Fn(i64, ManagedImage) + Send + Sync>,
            _on_error: Arc<dyn Fn() + Send + Sync>,
        ) -> Result<(), PipelineError> {
            self.sink.lock().unwrap().push((pkt.pts_micros(), on_image));
            Ok(())
        }

        fn wait_idle(&mut self) {}
    }

    #[test]
    fn push_packet_then_manual_completion_emits_through_sink() {
        use frameplay_core::TimeBase;

        let pending = Arc::new(Mutex::new(Vec::new()));
        let source = Box::new(ImmediateSource { sink: pending.clone() });
        let mut decoder = ReorderingDecoder::new(source);
        let sink = Arc::new(RecordingSink { seen: Mutex::new(Vec::new()), eof: AtomicBool::new(false) });
        decoder.init(sink.clone()).unwrap();

        let tb = TimeBase::new(1, 1);
        decoder.push_packet(&Packet::new(Arc::<[u8]>::from(&b"x"[..]), 100, tb)).unwrap();

        let (pts, cb) = pending.lock().unwrap().pop().unwrap();
        cb(pts, ManagedImage::new(7, || {}));
        // The first completion has nothing queued ahead of it to
        // supersede — it sits at the front until flush drains it.
        assert!(sink.seen.lock().unwrap().is_empty());

        decoder.flush();
        assert_eq!(*sink.seen.lock().unwrap(), vec![100]);
        assert!(sink.eof.load(Ordering::SeqCst));
    }
}
