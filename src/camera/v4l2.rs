//! V4L2 capture backend built on the `v4l` crate.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use v4l::buffer::Type;
use v4l::framesize::FrameSizeEnum;
use v4l::io::mmap::Stream as MmapStream;
use v4l::io::traits::{CaptureStream, Stream};
use v4l::video::Capture;
use v4l::{Device, FourCC};

use super::device::CaptureDevice;
use super::types::{
    CameraError, FormatDescription, FourCc, FrameSize, NegotiatedFormat, RawFrame, Wait,
};

/// Number of memory-mapped driver buffers.
const BUFFER_COUNT: u32 = 4;

/// How long stream start may wait for the first frame.
const START_TIMEOUT: Duration = Duration::from_secs(10);

/// A V4L2 device such as `/dev/video0`.
///
/// The first frame is dequeued while starting the stream so that every later
/// wait can poll the device fd with a timeout.
pub struct V4l2Device {
    // Declared before `device` so the stream is stopped before the handle closes.
    stream: Option<MmapStream<'static>>,
    device: Device,
    path: PathBuf,
    pending: Option<RawFrame>,
}

impl std::fmt::Debug for V4l2Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("V4l2Device")
            .field("path", &self.path)
            .field("streaming", &self.stream.is_some())
            .finish_non_exhaustive()
    }
}

impl V4l2Device {
    pub fn open(path: &Path) -> Result<Self, CameraError> {
        let device = Device::with_path(path).map_err(|e| CameraError::OpenFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        log::debug!("Opened V4L2 device {}", path.display());

        Ok(Self {
            stream: None,
            device,
            path: path.to_path_buf(),
            pending: None,
        })
    }

    fn next_buffer(stream: &mut MmapStream<'static>) -> io::Result<RawFrame> {
        let (buf, meta) = CaptureStream::next(stream)?;
        let used = (meta.bytesused as usize).min(buf.len());
        Ok(RawFrame::new(buf[..used].to_vec()))
    }

    fn poll_readable(&self, timeout: Duration) -> io::Result<bool> {
        let fd = self.device.handle().fd();
        poll_until(timeout, |remaining| {
            let mut fds = libc::pollfd {
                fd,
                events: libc::POLLIN,
                revents: 0,
            };
            let millis = remaining.as_millis().min(i32::MAX as u128) as i32;
            // SAFETY: `fds` is a valid pollfd for the duration of the call.
            match unsafe { libc::poll(&mut fds, 1, millis) } {
                -1 => Err(io::Error::last_os_error()),
                0 => Ok(false),
                _ => Ok(true),
            }
        })
    }
}

/// Run `poll_once` until it answers or `timeout` has elapsed. A signal
/// interrupting the call is retried with whatever time is left.
fn poll_until(
    timeout: Duration,
    mut poll_once: impl FnMut(Duration) -> io::Result<bool>,
) -> io::Result<bool> {
    let deadline = Instant::now() + timeout;
    let mut remaining = timeout;
    loop {
        match poll_once(remaining) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return Ok(false);
                }
                log::debug!("Frame wait interrupted, retrying");
            }
            other => return other,
        }
    }
}

impl CaptureDevice for V4l2Device {
    fn supported_formats(&self) -> Result<Vec<FormatDescription>, CameraError> {
        let formats = self
            .device
            .enum_formats()
            .map_err(|e| CameraError::QueryFailed(e.to_string()))?;

        Ok(formats
            .into_iter()
            .map(|d| FormatDescription {
                fourcc: FourCc::new(&d.fourcc.repr),
                description: d.description,
            })
            .collect())
    }

    fn supported_frame_sizes(&self, format: FourCc) -> Result<Vec<FrameSize>, CameraError> {
        let sizes = self
            .device
            .enum_framesizes(FourCC::new(&format.0))
            .map_err(|e| CameraError::QueryFailed(e.to_string()))?;

        Ok(sizes
            .into_iter()
            .map(|s| match s.size {
                FrameSizeEnum::Discrete(d) => FrameSize {
                    max_width: d.width,
                    max_height: d.height,
                },
                FrameSizeEnum::Stepwise(r) => FrameSize {
                    max_width: r.max_width,
                    max_height: r.max_height,
                },
            })
            .collect())
    }

    fn set_format(
        &mut self,
        format: FourCc,
        width: u32,
        height: u32,
    ) -> Result<NegotiatedFormat, CameraError> {
        let rejected = |e: io::Error| CameraError::NegotiationFailed {
            format,
            width,
            height,
            message: e.to_string(),
        };

        let mut requested = self.device.format().map_err(rejected)?;
        requested.width = width;
        requested.height = height;
        requested.fourcc = FourCC::new(&format.0);

        let actual = self.device.set_format(&requested).map_err(rejected)?;
        Ok(NegotiatedFormat {
            fourcc: FourCc::new(&actual.fourcc.repr),
            width: actual.width,
            height: actual.height,
            stride: actual.stride,
        })
    }

    fn frame_rate(&self) -> Result<f32, CameraError> {
        let params = self
            .device
            .params()
            .map_err(|e| CameraError::QueryFailed(e.to_string()))?;
        let interval = params.interval;
        if interval.numerator == 0 {
            return Err(CameraError::QueryFailed(
                "device reported a zero frame interval".to_string(),
            ));
        }
        Ok(interval.denominator as f32 / interval.numerator as f32)
    }

    fn start_streaming(&mut self) -> Result<(), CameraError> {
        let mut stream = MmapStream::with_buffers(&self.device, Type::VideoCapture, BUFFER_COUNT)
            .map_err(|e| CameraError::StreamFailed(e.to_string()))?;
        stream.set_timeout(START_TIMEOUT);

        // The first dequeue queues every buffer and turns streaming on.
        let first = Self::next_buffer(&mut stream).map_err(|e| {
            let _ = stream.stop();
            CameraError::StreamFailed(e.to_string())
        })?;

        self.pending = Some(first);
        self.stream = Some(stream);
        Ok(())
    }

    fn wait_for_frame(&mut self, timeout: Duration) -> Wait {
        if self.pending.is_some() {
            return Wait::Ready;
        }
        if self.stream.is_none() {
            return Wait::Fatal(CameraError::WaitFailed("stream not started".to_string()));
        }
        match self.poll_readable(timeout) {
            Ok(true) => Wait::Ready,
            Ok(false) => Wait::TimedOut,
            Err(e) => Wait::Fatal(CameraError::WaitFailed(e.to_string())),
        }
    }

    fn read_frame(&mut self) -> Result<RawFrame, CameraError> {
        if let Some(frame) = self.pending.take() {
            return Ok(frame);
        }
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| CameraError::ReadFailed("stream not started".to_string()))?;
        Self::next_buffer(stream).map_err(|e| CameraError::ReadFailed(e.to_string()))
    }
}
