//! Capture device abstraction.

use std::path::Path;
use std::time::Duration;

use super::types::{
    CameraError, FormatDescription, FourCc, FrameSize, NegotiatedFormat, RawFrame, Wait,
};

/// A video capture device.
///
/// Implementations own the underlying handle and release it on drop, so the
/// device is closed on every exit path.
pub trait CaptureDevice {
    /// Pixel formats the device can produce, in driver enumeration order.
    fn supported_formats(&self) -> Result<Vec<FormatDescription>, CameraError>;

    /// Frame sizes available for `format`.
    fn supported_frame_sizes(&self, format: FourCc) -> Result<Vec<FrameSize>, CameraError>;

    /// Request a format and size. Returns what the driver actually negotiated,
    /// which may differ from the request.
    fn set_format(
        &mut self,
        format: FourCc,
        width: u32,
        height: u32,
    ) -> Result<NegotiatedFormat, CameraError>;

    /// Device-reported capture rate in frames per second.
    fn frame_rate(&self) -> Result<f32, CameraError>;

    fn start_streaming(&mut self) -> Result<(), CameraError>;

    /// Block until a frame is available or `timeout` expires.
    fn wait_for_frame(&mut self, timeout: Duration) -> Wait;

    /// Read the frame made available by the last successful wait.
    fn read_frame(&mut self) -> Result<RawFrame, CameraError>;
}

impl<D: CaptureDevice + ?Sized> CaptureDevice for Box<D> {
    fn supported_formats(&self) -> Result<Vec<FormatDescription>, CameraError> {
        (**self).supported_formats()
    }

    fn supported_frame_sizes(&self, format: FourCc) -> Result<Vec<FrameSize>, CameraError> {
        (**self).supported_frame_sizes(format)
    }

    fn set_format(
        &mut self,
        format: FourCc,
        width: u32,
        height: u32,
    ) -> Result<NegotiatedFormat, CameraError> {
        (**self).set_format(format, width, height)
    }

    fn frame_rate(&self) -> Result<f32, CameraError> {
        (**self).frame_rate()
    }

    fn start_streaming(&mut self) -> Result<(), CameraError> {
        (**self).start_streaming()
    }

    fn wait_for_frame(&mut self, timeout: Duration) -> Wait {
        (**self).wait_for_frame(timeout)
    }

    fn read_frame(&mut self) -> Result<RawFrame, CameraError> {
        (**self).read_frame()
    }
}

/// Open the platform capture device at `path`.
#[cfg(all(feature = "v4l2", target_os = "linux"))]
pub fn open_device(path: &Path) -> Result<Box<dyn CaptureDevice + Send>, CameraError> {
    let device = super::v4l2::V4l2Device::open(path)?;
    Ok(Box::new(device))
}

/// Open the platform capture device at `path`.
#[cfg(not(all(feature = "v4l2", target_os = "linux")))]
pub fn open_device(path: &Path) -> Result<Box<dyn CaptureDevice + Send>, CameraError> {
    log::error!("No capture backend compiled in; cannot open {}", path.display());
    Err(CameraError::Unsupported)
}
