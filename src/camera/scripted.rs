//! In-memory capture device that replays a fixed script.
//!
//! Lets the throttler and pipeline run without hardware.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::device::CaptureDevice;
use super::types::{
    CameraError, FormatDescription, FourCc, FrameSize, NegotiatedFormat, RawFrame, Wait,
};

/// One scripted capture attempt.
#[derive(Debug, Clone)]
pub enum Step {
    /// Wait succeeds and the read returns these bytes
    Frame(Vec<u8>),
    /// Wait times out
    Timeout,
    /// Wait fails with a device error
    WaitError(String),
    /// Wait succeeds but the read fails
    ReadError(String),
}

/// Replays [`Step`]s in order. Once the script runs out every wait times out.
#[derive(Debug)]
pub struct ScriptedDevice {
    formats: Vec<FormatDescription>,
    sizes: Vec<(FourCc, FrameSize)>,
    frame_rate: f32,
    negotiated: Option<NegotiatedFormat>,
    /// Forces `set_format` to answer with this size instead of the request
    override_size: Option<(u32, u32)>,
    /// Row stride reported for YUYV; packed rows when unset
    yuyv_stride: Option<u32>,
    streaming: bool,
    script: VecDeque<Step>,
    current: Option<Step>,
    reads: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl ScriptedDevice {
    /// A single-format MJPEG device with the given frame sizes.
    pub fn new(frame_rate: f32, sizes: &[(u32, u32)]) -> Self {
        Self {
            formats: Vec::new(),
            sizes: Vec::new(),
            frame_rate,
            negotiated: None,
            override_size: None,
            yuyv_stride: None,
            streaming: false,
            script: VecDeque::new(),
            current: None,
            reads: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
        }
        .with_format(FourCc::MJPG, "Motion-JPEG", sizes)
    }

    /// Add another pixel format with its frame sizes.
    pub fn with_format(mut self, fourcc: FourCc, description: &str, sizes: &[(u32, u32)]) -> Self {
        self.formats.push(FormatDescription {
            fourcc,
            description: description.to_string(),
        });
        self.sizes.extend(sizes.iter().map(|&(w, h)| {
            (
                fourcc,
                FrameSize {
                    max_width: w,
                    max_height: h,
                },
            )
        }));
        self
    }

    /// A device reporting no formats at all.
    pub fn without_formats(frame_rate: f32) -> Self {
        let mut device = Self::new(frame_rate, &[]);
        device.formats.clear();
        device
    }

    /// Make the driver "adjust" every format request to `width`x`height`.
    pub fn negotiating_to(mut self, width: u32, height: u32) -> Self {
        self.override_size = Some((width, height));
        self
    }

    /// Report `stride` bytes per row when YUYV is negotiated, as a driver
    /// padding its rows would.
    pub fn with_yuyv_stride(mut self, stride: u32) -> Self {
        self.yuyv_stride = Some(stride);
        self
    }

    pub fn with_script(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.script.extend(steps);
        self
    }

    /// Counter of successful reads, shared so it can be observed after the
    /// device has been moved into the pipeline.
    pub fn read_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.reads)
    }

    /// Counter incremented when the device is dropped.
    pub fn close_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.closed)
    }

    pub fn negotiated(&self) -> Option<NegotiatedFormat> {
        self.negotiated
    }
}

impl CaptureDevice for ScriptedDevice {
    fn supported_formats(&self) -> Result<Vec<FormatDescription>, CameraError> {
        Ok(self.formats.clone())
    }

    fn supported_frame_sizes(&self, format: FourCc) -> Result<Vec<FrameSize>, CameraError> {
        Ok(self
            .sizes
            .iter()
            .filter(|(f, _)| *f == format)
            .map(|(_, s)| *s)
            .collect())
    }

    fn set_format(
        &mut self,
        format: FourCc,
        width: u32,
        height: u32,
    ) -> Result<NegotiatedFormat, CameraError> {
        if !self.formats.iter().any(|d| d.fourcc == format) {
            return Err(CameraError::NegotiationFailed {
                format,
                width,
                height,
                message: "format not supported".to_string(),
            });
        }
        let (w, h) = self.override_size.unwrap_or((width, height));
        let stride = if format == FourCc::YUYV {
            self.yuyv_stride.unwrap_or(w * 2)
        } else {
            0
        };
        let agreed = NegotiatedFormat {
            fourcc: format,
            width: w,
            height: h,
            stride,
        };
        self.negotiated = Some(agreed);
        Ok(agreed)
    }

    fn frame_rate(&self) -> Result<f32, CameraError> {
        Ok(self.frame_rate)
    }

    fn start_streaming(&mut self) -> Result<(), CameraError> {
        if self.negotiated.is_none() {
            return Err(CameraError::StreamFailed("format not negotiated".to_string()));
        }
        self.streaming = true;
        Ok(())
    }

    fn wait_for_frame(&mut self, timeout: Duration) -> Wait {
        if !self.streaming {
            return Wait::Fatal(CameraError::WaitFailed("stream not started".to_string()));
        }
        match self.script.pop_front() {
            Some(Step::Timeout) => Wait::TimedOut,
            Some(Step::WaitError(msg)) => Wait::Fatal(CameraError::WaitFailed(msg)),
            Some(step) => {
                self.current = Some(step);
                Wait::Ready
            }
            None => {
                // Script exhausted: behave like a stalled camera, briefly.
                std::thread::sleep(timeout.min(Duration::from_millis(1)));
                Wait::TimedOut
            }
        }
    }

    fn read_frame(&mut self) -> Result<RawFrame, CameraError> {
        match self.current.take() {
            Some(Step::Frame(bytes)) => {
                self.reads.fetch_add(1, Ordering::SeqCst);
                Ok(RawFrame::new(bytes))
            }
            Some(Step::ReadError(msg)) => Err(CameraError::ReadFailed(msg)),
            _ => Err(CameraError::ReadFailed("no frame ready".to_string())),
        }
    }
}

impl Drop for ScriptedDevice {
    fn drop(&mut self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}
