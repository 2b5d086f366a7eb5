//! In-place frame redraw.
//!
//! Each frame is written in full, then the cursor is walked back up over it
//! so the next frame overwrites this one instead of scrolling.

use std::io::{self, Write};

use super::AsciiFrame;

/// Move the cursor up one line.
pub const CURSOR_UP: &str = "\x1b[1A";

/// Return to column 0.
pub const CARRIAGE_RETURN: &str = "\r";

/// Write `frame` and leave the cursor at its top-left corner.
///
/// Emits the frame text, then one [`CURSOR_UP`] per row and a single
/// [`CARRIAGE_RETURN`]. Everything goes out in one `write_all` so a frame is
/// never split across writes.
pub fn render_frame<W: Write + ?Sized>(out: &mut W, frame: &AsciiFrame) -> io::Result<()> {
    let rows = usize::from(frame.height);
    let mut buf = frame.to_text();
    buf.reserve(rows * CURSOR_UP.len() + CARRIAGE_RETURN.len());
    for _ in 0..rows {
        buf.push_str(CURSOR_UP);
    }
    buf.push_str(CARRIAGE_RETURN);

    out.write_all(buf.as_bytes())?;
    out.flush()
}
