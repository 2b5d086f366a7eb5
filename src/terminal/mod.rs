//! Terminal output: the ASCII frame type, in-place redraw, and the output queue.

mod frame;
mod refresh;
mod writer;

pub use frame::AsciiFrame;
pub use refresh::{render_frame, CARRIAGE_RETURN, CURSOR_UP};
pub use writer::{frame_queue, run_writer, spawn_writer, Dispatch, FrameSink, WriterReport};
