// crates/frameplay-pipeline/src/seek_channel.rs
//
// Single-slot, mutex-protected Optional<ts> owned by the pipeline
// controller, polled by the reader at each loop iteration. Overwrites
// coalesce: only the most recent unclaimed seek survives (spec §3, §8
// invariant 9).
//
// Grounded on async.c's async_reader::request_seek + async_reader_seek()
// (lock, overwrite, unlock) and reader_thread's lock-read-clear sequence.
// The Rust shape (Mutex<Option<T>>, no condvar) follows the same idiom as
// velocut-media/src/worker.rs's `frame_req` latest-wins slot, minus the
// condvar since the reader polls once per loop iteration rather than
// blocking on a new seek (spec §9: "No condvar is needed because the
// reader polls each iteration").

use std::sync::Mutex;

pub struct SeekChannel {
    slot: Mutex<Option<i64>>,
}

impl SeekChannel {
    pub fn new() -> Self {
        Self { slot: Mutex::new(None) }
    }

    /// Store `ts`, overwriting any unclaimed prior request. Non-blocking.
    pub fn request(&self, ts: i64) {
        *self.slot.lock().unwrap() = Some(ts);
    }

    /// Read and clear the pending request, if any.
    pub fn take(&self) -> Option<i64> {
        self.slot.lock().unwrap().take()
    }
}

impl Default for SeekChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coalesces_to_most_recent() {
        let ch = SeekChannel::new();
        ch.request(100_000);
        ch.request(500_000);
        ch.request(300_000);
        assert_eq!(ch.take(), Some(300_000));
        assert_eq!(ch.take(), None);
    }

    #[test]
    fn take_clears_the_slot() {
        let ch = SeekChannel::new();
        ch.request(1);
        assert_eq!(ch.take(), Some(1));
        assert_eq!(ch.take(), None);
    }
}
