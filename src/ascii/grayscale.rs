//! Per-pixel luminance.
//!
//! Luminance is the plain mean of the channels, `(R + G + B) / 3`. Block
//! averaging accumulates channel sums and divides once per block, so the
//! mean is never truncated per pixel.

use crate::camera::PixelImage;

/// Sum of the three channels of the pixel at `(x, y)`.
#[inline]
pub(crate) fn channel_sum(image: &PixelImage, x: u32, y: u32) -> u32 {
    let [r, g, b] = image.rgb(x, y);
    u32::from(r) + u32::from(g) + u32::from(b)
}
