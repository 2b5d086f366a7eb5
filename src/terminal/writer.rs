//! Single-writer output queue.
//!
//! The capture loop hands finished frames to a bounded queue without ever
//! blocking; one dedicated writer drains it and renders frames in order, so
//! escape sequences from different frames never interleave.

use std::io::{self, Write};

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use super::refresh::render_frame;
use super::AsciiFrame;

/// Result of handing a frame to the writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Frame is queued for output
    Queued,
    /// Queue was full; the frame was discarded
    Dropped,
    /// The writer has stopped
    Closed,
}

/// Producer side of the output queue.
#[derive(Debug, Clone)]
pub struct FrameSink {
    tx: mpsc::Sender<AsciiFrame>,
}

impl FrameSink {
    /// Queue `frame` for output without waiting.
    pub fn dispatch(&self, frame: AsciiFrame) -> Dispatch {
        match self.tx.try_send(frame) {
            Ok(()) => Dispatch::Queued,
            Err(TrySendError::Full(_)) => Dispatch::Dropped,
            Err(TrySendError::Closed(_)) => Dispatch::Closed,
        }
    }
}

/// What the writer hands back once every sink is dropped.
#[derive(Debug)]
pub struct WriterReport<W> {
    pub out: W,
    pub frames_written: u64,
}

/// Create a queue holding at most `depth` frames (minimum 1).
pub fn frame_queue(depth: usize) -> (FrameSink, mpsc::Receiver<AsciiFrame>) {
    let (tx, rx) = mpsc::channel(depth.max(1));
    (FrameSink { tx }, rx)
}

/// Drain `rx` into `out` until every sender is gone. Blocking.
pub fn run_writer<W: Write>(
    mut rx: mpsc::Receiver<AsciiFrame>,
    mut out: W,
) -> io::Result<WriterReport<W>> {
    let mut frames_written = 0;
    while let Some(frame) = rx.blocking_recv() {
        render_frame(&mut out, &frame)?;
        frames_written += 1;
    }
    log::debug!("Writer finished after {} frame(s)", frames_written);
    Ok(WriterReport {
        out,
        frames_written,
    })
}

/// Start the dedicated writer on the blocking pool. Must be called from
/// within a tokio runtime.
pub fn spawn_writer<W: Write + Send + 'static>(
    out: W,
    depth: usize,
) -> (FrameSink, JoinHandle<io::Result<WriterReport<W>>>) {
    let (sink, rx) = frame_queue(depth);
    let handle = tokio::task::spawn_blocking(move || run_writer(rx, out));
    (sink, handle)
}
