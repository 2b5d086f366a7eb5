//! Block averaging of pixel luminance onto a character grid.

use crate::camera::PixelImage;

use super::grayscale::channel_sum;

/// Size in pixels of the source block behind one character cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSize {
    pub width: u32,
    pub height: u32,
}

impl BlockSize {
    /// Integer block ratio for mapping `src` pixels onto `cells` characters
    /// per axis. `None` when either ratio would be zero.
    pub fn for_grid(src_width: u32, src_height: u32, cells_x: u16, cells_y: u16) -> Option<Self> {
        if cells_x == 0 || cells_y == 0 {
            return None;
        }
        let width = src_width / u32::from(cells_x);
        let height = src_height / u32::from(cells_y);
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self { width, height })
    }
}

/// Average luminance of the block for cell `(i, j)`: pixels
/// `(bw*i + k, bh*j + l)` for `k < bw`, `l < bh`.
///
/// The caller guarantees the block lies inside the image. Pixels past
/// `bw*cells_x` / `bh*cells_y` belong to no block and are never read.
pub fn block_average(image: &PixelImage, block: BlockSize, i: u32, j: u32) -> u8 {
    let x0 = block.width * i;
    let y0 = block.height * j;
    let mut sum = 0u64;
    for y in y0..y0 + block.height {
        for x in x0..x0 + block.width {
            sum += u64::from(channel_sum(image, x, y));
        }
    }
    let samples = u64::from(block.width) * u64::from(block.height) * 3;
    (sum / samples) as u8
}

/// Average luminance of every cell of a `cells_x` x `cells_y` grid, row-major.
///
/// `block` must come from [`BlockSize::for_grid`] for this image and grid.
pub fn downsample(image: &PixelImage, block: BlockSize, cells_x: u16, cells_y: u16) -> Vec<u8> {
    let mut out = Vec::with_capacity(usize::from(cells_x) * usize::from(cells_y));
    for j in 0..u32::from(cells_y) {
        for i in 0..u32::from(cells_x) {
            out.push(block_average(image, block, i, j));
        }
    }
    out
}
