//! Capture format negotiation.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use super::device::CaptureDevice;
use super::types::{CameraError, CaptureFormat, FormatDescription, FourCc, FrameSize};

/// Which pixel format to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatPolicy {
    /// The first format the driver enumerates
    #[default]
    First,
    /// This format if offered, otherwise the first one
    Prefer(FourCc),
}

impl FormatPolicy {
    pub fn choose<'a>(&self, formats: &'a [FormatDescription]) -> Option<&'a FormatDescription> {
        match self {
            FormatPolicy::First => formats.first(),
            FormatPolicy::Prefer(wanted) => formats
                .iter()
                .find(|d| d.fourcc == *wanted)
                .or_else(|| formats.first()),
        }
    }
}

impl FromStr for FormatPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("first") {
            Ok(FormatPolicy::First)
        } else {
            s.parse::<FourCc>()
                .map(FormatPolicy::Prefer)
                .map_err(|_| format!("Unknown format '{}'. Use 'first' or a fourcc like MJPG", s))
        }
    }
}

impl fmt::Display for FormatPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatPolicy::First => write!(f, "first"),
            FormatPolicy::Prefer(fourcc) => write!(f, "{}", fourcc),
        }
    }
}

impl<'de> Deserialize<'de> for FormatPolicy {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Which frame size to request among those the chosen format supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SizePolicy {
    /// Largest width x height
    #[default]
    Largest,
    /// Smallest width x height
    Smallest,
}

impl SizePolicy {
    pub fn choose(&self, sizes: &[FrameSize]) -> Option<FrameSize> {
        // Ties keep the earliest enumerated entry.
        let mut best: Option<FrameSize> = None;
        for &size in sizes {
            let better = match (self, best) {
                (_, None) => true,
                (SizePolicy::Largest, Some(b)) => size.area() > b.area(),
                (SizePolicy::Smallest, Some(b)) => size.area() < b.area(),
            };
            if better {
                best = Some(size);
            }
        }
        best
    }
}

impl fmt::Display for SizePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizePolicy::Largest => write!(f, "largest"),
            SizePolicy::Smallest => write!(f, "smallest"),
        }
    }
}

/// Pick a format and size, request them, and record what the device agreed to.
///
/// # Errors
/// * `CameraError::NoFormats` - the device reports no pixel formats
/// * `CameraError::NoFrameSizes` - the chosen format has no frame sizes
/// * `CameraError::NegotiationFailed` - the driver rejects the request
pub fn negotiate<D: CaptureDevice + ?Sized>(
    device: &mut D,
    format_policy: FormatPolicy,
    size_policy: SizePolicy,
) -> Result<CaptureFormat, CameraError> {
    let formats = device.supported_formats()?;
    let chosen = format_policy
        .choose(&formats)
        .ok_or(CameraError::NoFormats)?
        .clone();

    let sizes = device.supported_frame_sizes(chosen.fourcc)?;
    let size = size_policy
        .choose(&sizes)
        .ok_or(CameraError::NoFrameSizes(chosen.fourcc))?;

    log::debug!(
        "Requesting {} {}x{} ({} of {} sizes)",
        chosen.fourcc,
        size.max_width,
        size.max_height,
        size_policy,
        sizes.len()
    );

    let agreed = device.set_format(chosen.fourcc, size.max_width, size.max_height)?;
    if (agreed.fourcc, agreed.width, agreed.height)
        != (chosen.fourcc, size.max_width, size.max_height)
    {
        log::info!(
            "Driver adjusted format to {} {}x{}",
            agreed.fourcc,
            agreed.width,
            agreed.height
        );
    }

    let frame_rate = device.frame_rate()?;

    // The negotiated format may differ from the requested one.
    let description = formats
        .iter()
        .find(|d| d.fourcc == agreed.fourcc)
        .map(|d| d.description.clone())
        .unwrap_or_else(|| agreed.fourcc.to_string());

    Ok(CaptureFormat {
        pixel_format: agreed.fourcc,
        description,
        width: agreed.width,
        height: agreed.height,
        stride: agreed.stride,
        frame_rate,
    })
}
