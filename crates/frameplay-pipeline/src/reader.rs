// crates/frameplay-pipeline/src/reader.rs
//
// The reader stage (spec §4.2): owns the packet source, polls for pending
// seeks once per loop iteration, and pushes packets downstream. Also the
// thread that spawns and joins the decoder stage, mirroring async.c's
// reader_thread / decoder_thread parent-child relationship exactly.
//
// Grounded line-for-line on async.c's reader_thread: the seek poll-clear
// at the top of the loop, push_seek_message's flush-then-send protocol,
// calling the source's seek callback only after the Seek message is
// queued, EAGAIN handling via a fixed retry delay, and the teardown
// sequence (set_err_recv on pkt_queue, then join the decoder).

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use frameplay_core::{Frame, Packet, PipelineError, PipelineMessage};

use crate::decoder_stage::{self, DecoderStageParams};
use crate::decoder_trait::Decoder;
use crate::filterer::Filterer;
use crate::queue::MessageQueue;
use crate::seek_channel::SeekChannel;
use crate::source::{PacketSource, PullStatus};

/// How long the reader sleeps after an `Again` before retrying
/// (async.c's reader_thread: `av_usleep(10000)`, i.e. 10ms).
const EAGAIN_RETRY: Duration = Duration::from_millis(10);

pub struct ReaderStageParams {
    pub pkt_queue: Arc<MessageQueue<PipelineMessage>>,
    pub frame_queue: Arc<MessageQueue<Frame>>,
    pub sink_queue: Arc<MessageQueue<Frame>>,
    pub source: Box<dyn PacketSource>,
    pub decoder: Box<dyn Decoder>,
    pub filterer: Box<dyn Filterer>,
    pub seek_channel: Arc<SeekChannel>,
}

/// Spawn the reader thread. It in turn spawns the decoder thread (which
/// spawns the filterer thread) — the whole pipeline hangs off this one
/// `JoinHandle`.
pub fn spawn(params: ReaderStageParams) -> JoinHandle<()> {
    thread::spawn(move || run(params))
}

pub fn run(params: ReaderStageParams) {
    let ReaderStageParams { pkt_queue, frame_queue, sink_queue, mut source, decoder, filterer, seek_channel } =
        params;

    let decoder_handle = decoder_stage::spawn(DecoderStageParams {
        pkt_queue: pkt_queue.clone(),
        frame_queue,
        sink_queue,
        decoder,
        filterer,
    });

    loop {
        if let Some(ts) = seek_channel.take() {
            if push_seek_message(&pkt_queue, ts).is_err() {
                break;
            }
            if !source.seek(ts) {
                eprintln!("[reader] seek to {ts} failed, stopping");
                break;
            }
        }

        match source.pull_packet() {
            PullStatus::Packet(pkt) => {
                if pkt_queue.send(PipelineMessage::Data(pkt)).is_err() {
                    break;
                }
            }
            PullStatus::Again => thread::sleep(EAGAIN_RETRY),
            PullStatus::Eof => break,
        }
    }

    pkt_queue.set_err_recv(PipelineError::Eof);
    let _ = decoder_handle.join();
}

/// Flush-then-send a `Seek` control message so it lands after anything
/// already queued and before anything pulled afterward (spec §4.2's
/// ordering guarantee; async.c's push_seek_message: flush, then send,
/// retrying the send against EAGAIN-equivalent backpressure).
fn push_seek_message(pkt_queue: &MessageQueue<PipelineMessage>, ts: i64) -> Result<(), PipelineError> {
    pkt_queue.flush();
    pkt_queue.send(PipelineMessage::Seek(ts))
}
