//! Camera types and data structures.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Four-character pixel format code as reported by the driver (e.g. `MJPG`, `YUYV`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCc(pub [u8; 4]);

impl FourCc {
    pub const MJPG: FourCc = FourCc(*b"MJPG");
    pub const YUYV: FourCc = FourCc(*b"YUYV");

    pub fn new(code: &[u8; 4]) -> Self {
        Self(*code)
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            let c = if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl FromStr for FourCc {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 4 || !bytes.iter().all(|b| b.is_ascii()) {
            return Err(format!("'{}' is not a four-character code", s));
        }
        Ok(FourCc([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

/// One entry of the device's pixel format enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatDescription {
    pub fourcc: FourCc,
    /// Driver-provided human-readable name
    pub description: String,
}

/// A supported frame size for a pixel format. Stepwise ranges are reported
/// by their maximum extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSize {
    pub max_width: u32,
    pub max_height: u32,
}

impl FrameSize {
    pub fn area(&self) -> u64 {
        u64::from(self.max_width) * u64::from(self.max_height)
    }
}

/// The driver's answer to a format request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegotiatedFormat {
    pub fourcc: FourCc,
    pub width: u32,
    pub height: u32,
    /// Bytes per row (`bytesperline`); 0 for compressed formats
    pub stride: u32,
}

/// The format the device actually agreed to. Fixed for the lifetime of the stream.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureFormat {
    pub pixel_format: FourCc,
    pub description: String,
    pub width: u32,
    pub height: u32,
    /// Bytes per row of uncompressed frames, padding included; 0 if unknown
    pub stride: u32,
    /// Device-reported frames per second
    pub frame_rate: f32,
}

impl fmt::Display for CaptureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} : {}x{} | {}fps",
            self.description, self.width, self.height, self.frame_rate
        )
    }
}

/// Bytes from one successful device read. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFrame(Vec<u8>);

impl RawFrame {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for RawFrame {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// A decoded RGB image (3 bytes per pixel, row-major).
#[derive(Debug, Clone)]
pub struct PixelImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl PixelImage {
    /// Build an image from packed RGB bytes. Returns `None` if the buffer
    /// length doesn't match the dimensions.
    pub fn from_rgb(data: Vec<u8>, width: u32, height: u32) -> Option<Self> {
        if data.len() != (width as usize) * (height as usize) * 3 {
            return None;
        }
        Some(Self {
            data,
            width,
            height,
        })
    }

    /// Solid-color image, mostly useful for tests.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take((width as usize) * (height as usize) * 3)
            .collect();
        Self {
            data,
            width,
            height,
        }
    }

    /// RGB components of the pixel at `(x, y)`.
    #[inline]
    pub fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        let idx = ((y as usize) * (self.width as usize) + x as usize) * 3;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }
}

/// Outcome of waiting for the next frame. Timeouts are decided here, at the
/// device boundary, and never re-inspected downstream.
#[derive(Debug)]
pub enum Wait {
    /// A frame is ready to be read
    Ready,
    /// The wait expired with no data; retry
    TimedOut,
    /// Unrecoverable device failure
    Fatal(CameraError),
}

/// Errors that can occur during camera operations.
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("Failed to open camera '{}': {message}", path.display())]
    OpenFailed { path: PathBuf, message: String },

    #[error("Camera reported no pixel formats")]
    NoFormats,

    #[error("Camera reported no frame sizes for format {0}")]
    NoFrameSizes(FourCc),

    #[error("Failed to query camera: {0}")]
    QueryFailed(String),

    #[error("Camera rejected format {format} {width}x{height}: {message}")]
    NegotiationFailed {
        format: FourCc,
        width: u32,
        height: u32,
        message: String,
    },

    #[error("Failed to start camera stream: {0}")]
    StreamFailed(String),

    #[error("Waiting for frame failed: {0}")]
    WaitFailed(String),

    #[error("Failed to read frame: {0}")]
    ReadFailed(String),

    #[error("Camera capture is not supported in this build (build on Linux with the `v4l2` feature)")]
    Unsupported,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fourcc_display_and_parse() {
        assert_eq!(FourCc::MJPG.to_string(), "MJPG");
        assert_eq!("YUYV".parse::<FourCc>().unwrap(), FourCc::YUYV);
        assert!("MJPEG".parse::<FourCc>().is_err());
        assert!("".parse::<FourCc>().is_err());
    }

    #[test]
    fn test_capture_format_display() {
        let format = CaptureFormat {
            pixel_format: FourCc::MJPG,
            description: "Motion-JPEG".to_string(),
            width: 1280,
            height: 720,
            stride: 0,
            frame_rate: 30.0,
        };
        assert_eq!(format.to_string(), "Motion-JPEG : 1280x720 | 30fps");
    }

    #[test]
    fn test_frame_size_area() {
        let size = FrameSize {
            max_width: 640,
            max_height: 480,
        };
        assert_eq!(size.area(), 307_200);
    }

    #[test]
    fn test_raw_frame_empty() {
        assert!(RawFrame::default().is_empty());
        let frame = RawFrame::from(vec![1, 2, 3]);
        assert_eq!(frame.as_bytes(), &[1, 2, 3]);
    }

    #[test]
    fn test_pixel_image_from_rgb_checks_length() {
        assert!(PixelImage::from_rgb(vec![0; 12], 2, 2).is_some());
        assert!(PixelImage::from_rgb(vec![0; 11], 2, 2).is_none());
    }

    #[test]
    fn test_pixel_image_filled_and_lookup() {
        let img = PixelImage::filled(3, 2, [10, 20, 30]);
        assert_eq!(img.data.len(), 18);
        assert_eq!(img.rgb(2, 1), [10, 20, 30]);
    }

    #[test]
    fn test_camera_error_display() {
        assert_eq!(CameraError::NoFormats.to_string(), "Camera reported no pixel formats");
        assert!(CameraError::NoFrameSizes(FourCc::YUYV)
            .to_string()
            .contains("YUYV"));
        assert!(CameraError::Unsupported.to_string().contains("v4l2"));
    }
}
