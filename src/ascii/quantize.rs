//! Pixel image to ASCII frame quantization.

use thiserror::Error;

use crate::camera::PixelImage;
use crate::terminal::AsciiFrame;

use super::charset::STANDARD_CHARSET;
use super::downsample::{downsample, BlockSize};
use super::mapping::map_to_chars;

/// Grid/source mismatches. These are configuration errors, not per-frame noise.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuantizeError {
    #[error("ASCII grid must be at least 1x1, got {width}x{height}")]
    EmptyGrid { width: u16, height: u16 },

    #[error(
        "{src_width}x{src_height} source is too small for a {width}x{height} ASCII grid; \
         lower --width/--height or use a larger capture size"
    )]
    SourceTooSmall {
        src_width: u32,
        src_height: u32,
        width: u16,
        height: u16,
    },
}

/// Maps pixel images onto a fixed `width` x `height` character grid.
///
/// Stateless: the output depends only on the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantizer {
    width: u16,
    height: u16,
}

impl Quantizer {
    pub fn new(width: u16, height: u16) -> Result<Self, QuantizeError> {
        if width == 0 || height == 0 {
            return Err(QuantizeError::EmptyGrid { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Check that a source of this size can be quantized, returning the
    /// block each cell averages over. Run at startup against the negotiated
    /// capture size so a bad grid fails before streaming begins.
    pub fn block_for(&self, src_width: u32, src_height: u32) -> Result<BlockSize, QuantizeError> {
        BlockSize::for_grid(src_width, src_height, self.width, self.height).ok_or(
            QuantizeError::SourceTooSmall {
                src_width,
                src_height,
                width: self.width,
                height: self.height,
            },
        )
    }

    /// Quantize one image.
    ///
    /// # Errors
    /// `QuantizeError::SourceTooSmall` if the image is narrower or shorter
    /// than the grid.
    pub fn quantize(&self, image: &PixelImage) -> Result<AsciiFrame, QuantizeError> {
        let block = self.block_for(image.width, image.height)?;
        let averages = downsample(image, block, self.width, self.height);
        let chars = map_to_chars(&averages, STANDARD_CHARSET);
        Ok(AsciiFrame::from_chars(chars, self.width, self.height))
    }
}
