// crates/frameplay-core/src/frame.rs
//
// A decoded frame with a timestamp normalised to the canonical microseconds
// time base before entering the frame queue (spec §3, §4.3's ts_norm()).
//
// A Frame holds either a plain CPU buffer (the generic decoder path,
// velocut-core::media_types::MediaResult::VideoFrame's RGBA Vec<u8> is the
// closest teacher analogue) or a ManagedImage (the reorder/credit decoder
// variant, spec §4.4): an opaque handle plus a release hook that fires on
// Drop. decoder_vt.c's buffer_release() calling bufcount_update_ref(-1) is
// the exact behaviour ManagedImage::drop reproduces — whichever thread
// drops the frame releases the credit, regardless of who allocated it.

use std::fmt;

/// Where a Frame's pixel/sample data lives.
pub enum FrameBuffer {
    /// Plain CPU-owned bytes (image or audio samples).
    Cpu(Vec<u8>),
    /// A handle to a platform/GPU-owned buffer under credit management.
    Managed(ManagedImage),
}

impl fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameBuffer::Cpu(bytes) => f.debug_tuple("Cpu").field(&bytes.len()).finish(),
            FrameBuffer::Managed(_) => f.debug_tuple("Managed").finish(),
        }
    }
}

/// An opaque platform image handle whose release is governed by a credit
/// manager (spec §4.4). The release hook is supplied by whichever decoder
/// produced the image; it is invoked exactly once, on drop.
pub struct ManagedImage {
    /// Opaque handle — this crate never interprets it, only carries it.
    pub handle: u64,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl ManagedImage {
    pub fn new(handle: u64, release: impl FnOnce() + Send + 'static) -> Self {
        Self { handle, release: Some(Box::new(release)) }
    }
}

impl Drop for ManagedImage {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// A decoded image or audio buffer with a timestamp in the canonical
/// microseconds time base.
pub struct Frame {
    pub pts_micros: i64,
    pub width: u32,
    pub height: u32,
    pub buffer: FrameBuffer,
}

impl Frame {
    pub fn cpu(pts_micros: i64, width: u32, height: u32, data: Vec<u8>) -> Self {
        Self { pts_micros, width, height, buffer: FrameBuffer::Cpu(data) }
    }

    pub fn managed(pts_micros: i64, width: u32, height: u32, image: ManagedImage) -> Self {
        Self { pts_micros, width, height, buffer: FrameBuffer::Managed(image) }
    }

    /// Used by the decoder stage's pts-rewrite-on-seek logic (spec §4.3).
    pub fn set_pts_micros(&mut self, pts_micros: i64) {
        self.pts_micros = pts_micros;
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("pts_micros", &self.pts_micros)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("buffer", &self.buffer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn managed_image_release_hook_fires_once_on_drop() {
        let fired = Arc::new(AtomicBool::new(false));
        let fired2 = fired.clone();
        let image = ManagedImage::new(42, move || fired2.store(true, Ordering::SeqCst));
        assert!(!fired.load(Ordering::SeqCst));
        drop(image);
        assert!(fired.load(Ordering::SeqCst));
    }

    #[test]
    fn set_pts_micros_rewrites_timestamp() {
        let mut frame = Frame::cpu(300_000, 4, 4, vec![0; 64]);
        frame.set_pts_micros(250_000);
        assert_eq!(frame.pts_micros, 250_000);
    }
}
