//! Capture pipeline: throttle, decode, quantize and dispatch frames until
//! shutdown.
//!
//! [`Pipeline::prepare`] does every fallible setup step (grid check,
//! negotiation, stream start) before any frame is captured. [`Pipeline::run`]
//! then drives three concurrent parts:
//!
//! - the capture loop on the blocking pool, owning the device
//! - the single terminal writer draining the output queue
//! - the quit watcher reading operator input
//!
//! Whichever part stops first triggers the shared [`Shutdown`]; the device is
//! dropped (and so closed) on every exit path.

use std::io::Write;

use tokio::io::AsyncBufRead;

use crate::ascii::Quantizer;
use crate::camera::{
    decoder_for, negotiate, CaptureDevice, CaptureFormat, FrameDecoder, Throttler,
};
use crate::config::Settings;
use crate::error::AppError;
use crate::quit::{watch_for_quit, QuitReason};
use crate::shutdown::Shutdown;
use crate::terminal::{spawn_writer, Dispatch, FrameSink};

/// Counters for one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Frames returned by the throttler, empty ones included
    pub frames_produced: u64,
    /// Frames handed to the writer
    pub frames_queued: u64,
    /// Frames discarded because the output queue was full
    pub frames_dropped: u64,
    /// Zero-length captures skipped without decoding
    pub empty_skipped: u64,
    /// Capture waits that timed out and were retried
    pub timeouts: u64,
}

/// Run the throttle/decode/quantize/dispatch loop until shutdown, until the
/// writer goes away, or until a fatal error. Blocking.
///
/// Empty captures are counted and skipped; they never reach the decoder.
///
/// # Errors
/// Any non-timeout camera failure, any decode failure, and any
/// quantization failure.
pub fn run_capture_loop<D: CaptureDevice>(
    throttler: &mut Throttler<D>,
    decoder: &dyn FrameDecoder,
    quantizer: &Quantizer,
    sink: &FrameSink,
    shutdown: &Shutdown,
) -> Result<PipelineStats, AppError> {
    let mut stats = PipelineStats::default();

    while !shutdown.is_triggered() {
        let Some(raw) = throttler.next_frame()? else {
            break;
        };
        stats.frames_produced += 1;

        if raw.is_empty() {
            stats.empty_skipped += 1;
            log::debug!("Skipping empty capture");
            continue;
        }

        let image = decoder.decode(raw.as_bytes())?;
        let frame = quantizer.quantize(&image)?;

        match sink.dispatch(frame) {
            Dispatch::Queued => stats.frames_queued += 1,
            Dispatch::Dropped => {
                stats.frames_dropped += 1;
                log::debug!("Output queue full, dropped frame");
            }
            Dispatch::Closed => {
                log::debug!("Writer stopped, ending capture loop");
                break;
            }
        }
    }

    stats.timeouts = throttler.timeouts();
    Ok(stats)
}

/// Everything a finished run hands back.
#[derive(Debug)]
pub struct RunReport<W> {
    pub stats: PipelineStats,
    pub frames_written: u64,
    /// Why the quit watcher returned
    pub quit: QuitReason,
    /// The output stream, returned for inspection
    pub out: W,
}

/// A negotiated, streaming device ready to be run.
pub struct Pipeline<D> {
    device: D,
    format: CaptureFormat,
    decoder: Box<dyn FrameDecoder>,
    quantizer: Quantizer,
    settings: Settings,
}

impl<D> std::fmt::Debug for Pipeline<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("format", &self.format)
            .field("quantizer", &self.quantizer)
            .finish_non_exhaustive()
    }
}

impl<D> Pipeline<D>
where
    D: CaptureDevice + Send + 'static,
{
    /// Negotiate a format, check the grid against it, and start streaming.
    ///
    /// # Errors
    /// Configuration errors (grid too large for the negotiated size) are
    /// reported before the stream is started. On any error the device is
    /// dropped.
    pub fn prepare(settings: &Settings, mut device: D) -> Result<Self, AppError> {
        let quantizer = Quantizer::new(settings.width, settings.height)?;
        let format = negotiate(&mut device, settings.format, settings.size)?;
        quantizer.block_for(format.width, format.height)?;
        let decoder = decoder_for(&format);

        device.start_streaming()?;
        log::info!("Streaming {}", format);

        Ok(Self {
            device,
            format,
            decoder,
            quantizer,
            settings: settings.clone(),
        })
    }

    /// The format the device actually negotiated.
    pub fn format(&self) -> &CaptureFormat {
        &self.format
    }

    /// Run until shutdown or a fatal error.
    ///
    /// Frames are rendered to `output`; operator lines are read from `input`.
    /// Shutdown is triggered on the way out whatever the cause, and the
    /// writer is allowed to drain before returning.
    pub async fn run<W, R>(
        self,
        output: W,
        input: R,
        shutdown: Shutdown,
    ) -> Result<RunReport<W>, AppError>
    where
        W: Write + Send + 'static,
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let Pipeline {
            device,
            format,
            decoder,
            quantizer,
            settings,
        } = self;

        let (sink, writer) = spawn_writer(output, settings.queue_depth);
        let quit = tokio::spawn(watch_for_quit(input, shutdown.clone()));

        let mut throttler = Throttler::new(
            device,
            &format,
            settings.fps,
            settings.wait_timeout,
            shutdown.clone(),
        );
        let loop_shutdown = shutdown.clone();
        let capture = tokio::task::spawn_blocking(move || {
            run_capture_loop(
                &mut throttler,
                &*decoder,
                &quantizer,
                &sink,
                &loop_shutdown,
            )
        });

        // The throttler and the sink are dropped when the blocking task
        // ends, which closes the device and lets the writer finish.
        let captured = match capture.await {
            Ok(result) => result,
            Err(e) => Err(AppError::from(e)),
        };
        if let Err(e) = &captured {
            log::error!("Capture loop failed: {}", e);
        }
        shutdown.trigger();

        let quit = quit.await?;
        let written = writer.await?;

        let stats = captured?;
        let written = written?;
        log::info!(
            "Captured {} frame(s): {} queued, {} dropped, {} empty, {} timeout(s); {} written",
            stats.frames_produced,
            stats.frames_queued,
            stats.frames_dropped,
            stats.empty_skipped,
            stats.timeouts,
            written.frames_written
        );

        Ok(RunReport {
            stats,
            frames_written: written.frames_written,
            quit,
            out: written.out,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{PixelImage, ScriptedDevice, Step};
    use crate::terminal::frame_queue;
    use std::time::Duration;

    /// Decodes any non-empty buffer to a solid image whose shade is the
    /// buffer's first byte. Panics on empty input.
    struct ShadeDecoder;

    impl FrameDecoder for ShadeDecoder {
        fn decode(&self, bytes: &[u8]) -> Result<PixelImage, crate::camera::DecodeError> {
            assert!(!bytes.is_empty(), "empty buffer reached the decoder");
            let v = bytes[0];
            Ok(PixelImage::filled(8, 4, [v, v, v]))
        }
    }

    fn throttler(steps: Vec<Step>, shutdown: &Shutdown) -> Throttler<ScriptedDevice> {
        let mut dev = ScriptedDevice::new(10.0, &[(8, 4)]).with_script(steps);
        let format = negotiate(&mut dev, Default::default(), Default::default()).unwrap();
        dev.start_streaming().unwrap();
        Throttler::new(dev, &format, 10, Duration::from_millis(5), shutdown.clone())
    }

    #[test]
    fn test_capture_loop_skips_empty_and_drops_when_full() {
        let shutdown = Shutdown::new();
        let mut throttler = throttler(
            vec![
                Step::Frame(vec![255]),
                Step::Frame(Vec::new()),
                Step::Frame(vec![0]),
                Step::Frame(vec![0]),
            ],
            &shutdown,
        );
        let (sink, mut rx) = frame_queue(1);
        let quantizer = Quantizer::new(2, 1).unwrap();

        // The script runs dry after four frames; stop the loop from outside.
        let stopper = {
            let shutdown = shutdown.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(50));
                shutdown.trigger();
            })
        };
        let stats =
            run_capture_loop(&mut throttler, &ShadeDecoder, &quantizer, &sink, &shutdown).unwrap();
        stopper.join().unwrap();

        assert_eq!(stats.frames_produced, 4);
        assert_eq!(stats.empty_skipped, 1);
        assert_eq!(stats.frames_queued, 1);
        assert_eq!(stats.frames_dropped, 2);
        assert!(stats.timeouts > 0);

        let first = rx.try_recv().unwrap();
        assert_eq!(first.to_text(), "@@\n");
    }

    #[test]
    fn test_capture_loop_ends_when_writer_gone() {
        let shutdown = Shutdown::new();
        let mut throttler = throttler(
            vec![Step::Frame(vec![9]), Step::Frame(vec![9])],
            &shutdown,
        );
        let (sink, rx) = frame_queue(1);
        drop(rx);
        let quantizer = Quantizer::new(2, 1).unwrap();

        let stats =
            run_capture_loop(&mut throttler, &ShadeDecoder, &quantizer, &sink, &shutdown).unwrap();
        assert_eq!(stats.frames_produced, 1);
        assert_eq!(stats.frames_queued, 0);
        assert!(!shutdown.is_triggered());
    }

    #[test]
    fn test_capture_loop_read_error_is_fatal() {
        let shutdown = Shutdown::new();
        let mut throttler = throttler(
            vec![Step::Frame(vec![1]), Step::ReadError("unplugged".into())],
            &shutdown,
        );
        let (sink, _rx) = frame_queue(4);
        let quantizer = Quantizer::new(2, 1).unwrap();

        let result = run_capture_loop(&mut throttler, &ShadeDecoder, &quantizer, &sink, &shutdown);
        assert!(matches!(result, Err(AppError::Camera(_))));
    }

    #[test]
    fn test_capture_loop_returns_immediately_when_shutdown() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        let mut throttler = throttler(vec![Step::Frame(vec![1])], &shutdown);
        let (sink, _rx) = frame_queue(4);
        let quantizer = Quantizer::new(2, 1).unwrap();

        let stats =
            run_capture_loop(&mut throttler, &ShadeDecoder, &quantizer, &sink, &shutdown).unwrap();
        assert_eq!(stats, PipelineStats::default());
        let reads = throttler.device().read_counter();
        assert_eq!(reads.load(std::sync::atomic::Ordering::SeqCst), 0);
    }
}
