// crates/frameplay-cli/src/main.rs
//
// A thin demo binary: wires a SyntheticSource + PassthroughDecoder into a
// PipelineController and drives it from a line-oriented REPL. Mirrors
// velocut-ui's role relative to velocut-core/velocut-media — a host
// application, not library logic.

mod passthrough_decoder;
mod status;
mod synthetic_source;

use std::io::{self, BufRead, Write};

use frameplay_pipeline::{DecoderOptions, PipelineController, PipelineError};
use passthrough_decoder::PassthroughDecoder;
use status::StatusEvent;
use synthetic_source::SyntheticSource;

fn main() {
    let controller = match PipelineController::alloc(DecoderOptions::default()) {
        Ok(controller) => controller,
        Err(err) => {
            eprintln!("[cli] failed to allocate pipeline: {err}");
            std::process::exit(1);
        }
    };

    controller.register_source(Box::new(SyntheticSource::new(25, 250))).unwrap();
    controller.register_decoder(Box::new(PassthroughDecoder::new())).unwrap();

    if let Err(err) = controller.start(0) {
        eprintln!("[cli] failed to start pipeline: {err}");
        std::process::exit(1);
    }

    // Status reporting runs on its own thread, decoupled from the REPL
    // loop, so a slow println never holds up the next seek/pop command.
    let (status_tx, status_rx) = crossbeam_channel::bounded(8);
    let reporter = status::spawn_reporter(status_rx);

    println!("frameplay demo — commands: seek <ms>, pop, quit");
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };
        let mut parts = line.trim().split_whitespace();
        match parts.next() {
            Some("seek") => match parts.next().and_then(|s| s.parse::<i64>().ok()) {
                Some(ms) => controller.seek(ms * 1_000),
                None => println!("usage: seek <ms>"),
            },
            Some("pop") => match controller.pop_frame() {
                Ok(frame) => {
                    let _ = status_tx.send(StatusEvent::FramePopped(frame.pts_micros));
                }
                Err(PipelineError::Eof) => {
                    let _ = status_tx.send(StatusEvent::EndOfStream);
                    break;
                }
                Err(err) => {
                    let _ = status_tx.send(StatusEvent::Error(err.to_string()));
                }
            },
            Some("quit") | Some("exit") => break,
            Some(other) => println!("unknown command: {other}"),
            None => {}
        }
        let _ = io::stdout().flush();
    }

    controller.stop();
    drop(status_tx);
    let _ = reporter.join();
}
