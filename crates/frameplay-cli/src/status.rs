// crates/frameplay-cli/src/status.rs
//
// A decoupled status-report channel, mirroring velocut-media::worker's
// `MediaResult` channel role: the thread driving the pipeline pushes
// events onto a bounded channel rather than printing inline, and a
// separate reporter thread drains it. Scaled down from the teacher's
// probe/waveform/encode-progress/frame union to the handful of events
// this demo binary actually produces.

use std::thread::{self, JoinHandle};

use crossbeam_channel::Receiver;

pub enum StatusEvent {
    FramePopped(i64),
    EndOfStream,
    Error(String),
}

pub fn spawn_reporter(rx: Receiver<StatusEvent>) -> JoinHandle<()> {
    thread::spawn(move || {
        for event in rx {
            match event {
                StatusEvent::FramePopped(pts) => println!("frame pts_micros={pts}"),
                StatusEvent::EndOfStream => println!("end of stream"),
                StatusEvent::Error(msg) => println!("error: {msg}"),
            }
        }
    })
}
