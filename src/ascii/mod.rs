//! ASCII renderer module for converting camera frames to ASCII art.
//!
//! The conversion is a fixed pipeline:
//!
//! 1. **Luminance** - mean of the RGB channels
//! 2. **Block averaging** - integer-ratio blocks, edge remainder ignored
//! 3. **Glyph mapping** - monotonic lookup into a 10-level ramp
//!
//! [`Quantizer`] ties the steps together.

mod charset;
mod downsample;
mod grayscale;
mod mapping;
mod quantize;

pub use charset::{BRIGHTEST, DARKEST, STANDARD_CHARSET};
pub use downsample::{block_average, downsample, BlockSize};
pub use mapping::{glyph_index, map_to_chars};
pub use quantize::{QuantizeError, Quantizer};
