//! Unit tests for the terminal refresher and the output writer.
//!
//! Output is captured into a `Vec<u8>`; no real terminal is needed.

use cam2ascii::terminal::*;

fn frame_of(c: char, width: u16, height: u16) -> AsciiFrame {
    AsciiFrame::from_chars(vec![c; usize::from(width) * usize::from(height)], width, height)
}

fn rendered(frame: &AsciiFrame) -> String {
    let mut out = Vec::new();
    render_frame(&mut out, frame).unwrap();
    String::from_utf8(out).unwrap()
}

// ==================== Refresher ====================

#[test]
fn test_render_ends_with_cursor_reset() {
    for &(w, h) in &[(1u16, 1u16), (80, 24), (320, 90), (3, 7)] {
        let frame = frame_of('#', w, h);
        let text = rendered(&frame);
        let suffix = format!("{}{}", CURSOR_UP.repeat(usize::from(h)), CARRIAGE_RETURN);
        assert!(text.ends_with(&suffix), "bad suffix for {}x{}", w, h);
        assert!(text.starts_with(&frame.to_text()));
        assert_eq!(text.len(), frame.to_text().len() + suffix.len());
    }
}

#[test]
fn test_render_rows_in_order() {
    let frame = AsciiFrame::from_chars("abcdef".chars().collect(), 3, 2);
    assert_eq!(rendered(&frame), "abc\ndef\n\x1b[1A\x1b[1A\r");
}

#[test]
fn test_consecutive_renders_do_not_scroll() {
    // After each frame the cursor is back on the first row, so two frames
    // emit the same number of newlines as cursor-ups.
    let mut out = Vec::new();
    render_frame(&mut out, &frame_of('.', 4, 3)).unwrap();
    render_frame(&mut out, &frame_of('@', 4, 3)).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.matches('\n').count(), text.matches(CURSOR_UP).count());
}

#[test]
fn test_frame_to_text_line_lengths() {
    let frame = frame_of('=', 5, 4);
    let text = frame.to_text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines.iter().all(|l| l.chars().count() == 5));
}

// ==================== Writer ====================

#[tokio::test]
async fn test_writer_preserves_dispatch_order() {
    let (sink, handle) = spawn_writer(Vec::new(), 8);
    for c in ['a', 'b', 'c'] {
        assert_eq!(sink.dispatch(frame_of(c, 2, 1)), Dispatch::Queued);
    }
    drop(sink);

    let report = handle.await.unwrap().unwrap();
    assert_eq!(report.frames_written, 3);
    let text = String::from_utf8(report.out).unwrap();
    assert_eq!(text, "aa\n\x1b[1A\rbb\n\x1b[1A\rcc\n\x1b[1A\r");
}

#[tokio::test]
async fn test_writer_finishes_with_no_frames() {
    let (sink, handle) = spawn_writer(Vec::new(), 2);
    drop(sink);
    let report = handle.await.unwrap().unwrap();
    assert_eq!(report.frames_written, 0);
    assert!(report.out.is_empty());
}

#[test]
fn test_full_queue_drops_instead_of_blocking() {
    let (sink, mut rx) = frame_queue(2);
    assert_eq!(sink.dispatch(frame_of('1', 1, 1)), Dispatch::Queued);
    assert_eq!(sink.dispatch(frame_of('2', 1, 1)), Dispatch::Queued);
    assert_eq!(sink.dispatch(frame_of('3', 1, 1)), Dispatch::Dropped);

    assert_eq!(rx.try_recv().unwrap().chars, vec!['1']);
    assert_eq!(rx.try_recv().unwrap().chars, vec!['2']);
    assert!(rx.try_recv().is_err());
}
