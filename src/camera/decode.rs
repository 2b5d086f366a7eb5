//! Decoding raw capture buffers into RGB images.

use thiserror::Error;

use super::types::{CaptureFormat, FourCc, PixelImage};

/// Errors that can occur while decoding a captured frame.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Failed to decode frame: {0}")]
    Image(#[from] image::ImageError),

    #[error("YUYV needs an even frame width, got {width}")]
    OddWidth { width: u32 },

    #[error("YUYV frame is {actual} bytes, expected {expected} for {width}x{height}")]
    BadLength {
        expected: usize,
        actual: usize,
        width: u32,
        height: u32,
    },
}

/// Turns the bytes of one capture into an RGB image.
pub trait FrameDecoder: Send {
    fn decode(&self, bytes: &[u8]) -> Result<PixelImage, DecodeError>;
}

impl<F: FrameDecoder + ?Sized> FrameDecoder for Box<F> {
    fn decode(&self, bytes: &[u8]) -> Result<PixelImage, DecodeError> {
        (**self).decode(bytes)
    }
}

/// Compressed formats (JPEG/MJPEG) via the `image` crate, which sniffs the
/// container from the bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDecoder;

impl FrameDecoder for ImageDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<PixelImage, DecodeError> {
        let rgb = image::load_from_memory(bytes)?.to_rgb8();
        let (width, height) = rgb.dimensions();
        Ok(PixelImage {
            data: rgb.into_raw(),
            width,
            height,
        })
    }
}

/// Packed YUYV 4:2:2. Raw frames carry no header, so the geometry comes
/// from the negotiated format.
#[derive(Debug, Clone, Copy)]
pub struct YuyvDecoder {
    pub width: u32,
    pub height: u32,
    /// Bytes from the start of one row to the next. Drivers may pad rows past
    /// `width * 2`; anything smaller is treated as packed.
    pub stride: u32,
}

impl YuyvDecoder {
    fn row_bytes(&self) -> usize {
        self.width as usize * 2
    }

    fn stride_bytes(&self) -> usize {
        (self.stride as usize).max(self.row_bytes())
    }
}

impl FrameDecoder for YuyvDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<PixelImage, DecodeError> {
        if self.width % 2 != 0 {
            return Err(DecodeError::OddWidth { width: self.width });
        }

        let row_bytes = self.row_bytes();
        let stride = self.stride_bytes();
        // The last row needs no trailing padding.
        let expected = match self.height as usize {
            0 => 0,
            h => stride * (h - 1) + row_bytes,
        };
        if bytes.len() < expected {
            return Err(DecodeError::BadLength {
                expected,
                actual: bytes.len(),
                width: self.width,
                height: self.height,
            });
        }

        let mut data = Vec::with_capacity(self.width as usize * self.height as usize * 3);
        for y in 0..self.height as usize {
            let start = y * stride;
            for quad in bytes[start..start + row_bytes].chunks_exact(4) {
                let (y0, u, y1, v) = (quad[0], quad[1], quad[2], quad[3]);
                data.extend_from_slice(&yuv_to_rgb(y0, u, v));
                data.extend_from_slice(&yuv_to_rgb(y1, u, v));
            }
        }

        Ok(PixelImage {
            data,
            width: self.width,
            height: self.height,
        })
    }
}

/// BT.601 YCbCr to RGB with integer math (coefficients scaled by 256).
fn yuv_to_rgb(y: u8, u: u8, v: u8) -> [u8; 3] {
    let c = i32::from(y) - 16;
    let d = i32::from(u) - 128;
    let e = i32::from(v) - 128;
    let r = (298 * c + 409 * e + 128) >> 8;
    let g = (298 * c - 100 * d - 208 * e + 128) >> 8;
    let b = (298 * c + 516 * d + 128) >> 8;
    [r.clamp(0, 255) as u8, g.clamp(0, 255) as u8, b.clamp(0, 255) as u8]
}

/// Pick the decoder matching the negotiated pixel format.
pub fn decoder_for(format: &CaptureFormat) -> Box<dyn FrameDecoder> {
    if format.pixel_format == FourCc::YUYV {
        Box::new(YuyvDecoder {
            width: format.width,
            height: format.height,
            stride: format.stride,
        })
    } else {
        Box::new(ImageDecoder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;

    fn encode(img: &RgbImage, format: ImageFormat) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_image_decoder_png() {
        let img = RgbImage::from_pixel(4, 2, image::Rgb([10, 200, 30]));
        let decoded = ImageDecoder.decode(&encode(&img, ImageFormat::Png)).unwrap();
        assert_eq!((decoded.width, decoded.height), (4, 2));
        assert_eq!(decoded.rgb(3, 1), [10, 200, 30]);
    }

    #[test]
    fn test_image_decoder_jpeg_dimensions() {
        let img = RgbImage::from_pixel(16, 8, image::Rgb([255, 255, 255]));
        let decoded = ImageDecoder.decode(&encode(&img, ImageFormat::Jpeg)).unwrap();
        assert_eq!((decoded.width, decoded.height), (16, 8));
        assert_eq!(decoded.data.len(), 16 * 8 * 3);
        // JPEG is lossy, but white stays close to white.
        assert!(decoded.rgb(0, 0).iter().all(|&c| c > 240));
    }

    #[test]
    fn test_image_decoder_rejects_garbage() {
        let result = ImageDecoder.decode(&[0xde, 0xad, 0xbe, 0xef]);
        assert!(matches!(result, Err(DecodeError::Image(_))));
    }

    #[test]
    fn test_yuyv_black_and_white() {
        let decoder = YuyvDecoder {
            width: 2,
            height: 1,
            stride: 4,
        };
        let black = decoder.decode(&[16, 128, 16, 128]).unwrap();
        assert_eq!(black.data, vec![0; 6]);

        let white = decoder.decode(&[235, 128, 235, 128]).unwrap();
        assert_eq!(white.data, vec![255; 6]);
    }

    #[test]
    fn test_yuyv_short_buffer() {
        let decoder = YuyvDecoder {
            width: 4,
            height: 2,
            stride: 0,
        };
        let err = decoder.decode(&[0; 10]).unwrap_err();
        assert!(matches!(err, DecodeError::BadLength { expected: 16, actual: 10, .. }));
    }

    #[test]
    fn test_yuyv_odd_width() {
        let decoder = YuyvDecoder {
            width: 3,
            height: 1,
            stride: 0,
        };
        let err = decoder.decode(&[16; 64]).unwrap_err();
        assert!(matches!(err, DecodeError::OddWidth { width: 3 }));
        assert_eq!(err.to_string(), "YUYV needs an even frame width, got 3");
    }

    #[test]
    fn test_yuyv_skips_row_padding() {
        // 2x2 frame, rows padded from 4 to 8 bytes with dark filler.
        let decoder = YuyvDecoder {
            width: 2,
            height: 2,
            stride: 8,
        };
        let bytes = [
            235, 128, 235, 128, 16, 128, 16, 128, //
            235, 128, 235, 128,
        ];
        let image = decoder.decode(&bytes).unwrap();
        assert_eq!(image.data, vec![255; 12]);

        // Missing part of the last row is still short.
        let err = decoder.decode(&bytes[..10]).unwrap_err();
        assert!(matches!(err, DecodeError::BadLength { expected: 12, actual: 10, .. }));
    }

    #[test]
    fn test_decoder_for_format() {
        let mut format = CaptureFormat {
            pixel_format: FourCc::YUYV,
            description: "YUYV 4:2:2".to_string(),
            width: 2,
            height: 2,
            stride: 8,
            frame_rate: 30.0,
        };
        let padded = [235, 128, 235, 128, 0, 0, 0, 0, 235, 128, 235, 128];
        assert_eq!(decoder_for(&format).decode(&padded).unwrap().data, vec![255; 12]);

        format.height = 1;
        format.stride = 0;
        assert!(decoder_for(&format).decode(&[16, 128, 16, 128]).is_ok());

        format.pixel_format = FourCc::MJPG;
        assert!(decoder_for(&format).decode(&[16, 128, 16, 128]).is_err());
    }
}
