use crate::utils::rgb565_to_rgb888;
use byteorder::ByteOrder;
use image::RgbImage;
use snafu::{ensure, OptionExt, Snafu};

#[derive(Debug, Snafu)]
#[snafu(module)]
pub enum DecodeError {
    #[snafu(display("invalid image dimensions {width}x{height}"))]
    InvalidDimensions { width: u32, height: u32 },
    #[snafu(display(
        "raw stream is {len} bytes, but a {width}x{height} image needs {expected} bytes"
    ))]
    LengthMismatch {
        width: u32,
        height: u32,
        len: usize,
        expected: usize,
    },
}

/// Expands a raw RGB565 stream back into an RGB888 image.
///
/// The stream has no header, so the dimensions have to be supplied. Its length must be exactly
/// `2 * width * height`.
pub fn decode_to_image<B: ByteOrder>(
    data: &[u8],
    width: u32,
    height: u32,
) -> Result<RgbImage, DecodeError> {
    ensure!(
        width > 0 && height > 0,
        decode_error::InvalidDimensionsSnafu { width, height }
    );
    let expected = crate::raw_len(width, height)
        .context(decode_error::InvalidDimensionsSnafu { width, height })?;
    ensure!(
        data.len() == expected,
        decode_error::LengthMismatchSnafu {
            width,
            height,
            len: data.len(),
            expected,
        }
    );

    let mut image = RgbImage::new(width, height);
    for (pixel, chunk) in image.pixels_mut().zip(data.chunks_exact(2)) {
        pixel.0 = rgb565_to_rgb888(B::read_u16(chunk));
    }

    Ok(image)
}
