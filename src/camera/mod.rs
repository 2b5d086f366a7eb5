//! Camera capture module: device access, format negotiation, throttling and decoding.
//!
//! - Device access via the [`CaptureDevice`] trait ([`open_device`] for the
//!   platform backend, [`ScriptedDevice`] for replaying a fixed script)
//! - Format selection via [`negotiate`]
//! - Display-rate capture via [`Throttler`]
//! - Decoding via [`FrameDecoder`]

mod decode;
mod device;
mod negotiate;
mod scripted;
mod throttle;
mod types;
#[cfg(all(feature = "v4l2", target_os = "linux"))]
mod v4l2;

pub use decode::{decoder_for, DecodeError, FrameDecoder, ImageDecoder, YuyvDecoder};
pub use device::{open_device, CaptureDevice};
pub use negotiate::{negotiate, FormatPolicy, SizePolicy};
pub use scripted::{ScriptedDevice, Step};
pub use throttle::{skip_count, Throttler};
pub use types::{
    CameraError, CaptureFormat, FormatDescription, FourCc, FrameSize, NegotiatedFormat, PixelImage,
    RawFrame, Wait,
};
#[cfg(all(feature = "v4l2", target_os = "linux"))]
pub use v4l2::V4l2Device;
