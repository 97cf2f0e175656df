use crate::utils::rgb888_to_rgb565;
use byteorder::{ByteOrder, WriteBytesExt};
use image::RgbImage;
use snafu::{ResultExt, Snafu};
use std::io::Write;

#[derive(Debug, Snafu)]
#[snafu(module)]
pub enum EncodeError {
    #[snafu(display("failed to write pixel {index}"))]
    WriteIo {
        index: usize,
        source: std::io::Error,
    },
}

/// Packs RGB888 pixels into RGB565 and writes them to `w`, two bytes per pixel in the byte order
/// `B`.
///
/// Pixels are written in iteration order. Returns the number of bytes written.
pub fn encode_pixels<B, W>(
    pixels: impl IntoIterator<Item = [u8; 3]>,
    mut w: W,
) -> Result<usize, EncodeError>
where
    B: ByteOrder,
    W: Write,
{
    let mut written = 0;

    for (index, pixel) in pixels.into_iter().enumerate() {
        w.write_u16::<B>(rgb888_to_rgb565(pixel))
            .context(encode_error::WriteIoSnafu { index })?;
        written += 2;
    }

    Ok(written)
}

/// Packs an image row by row.
pub fn encode_image<B, W>(image: &RgbImage, w: W) -> Result<usize, EncodeError>
where
    B: ByteOrder,
    W: Write,
{
    encode_pixels::<B, W>(image.pixels().map(|p| p.0), w)
}

/// Packs an image into a freshly allocated buffer of exactly `2 * width * height` bytes.
pub fn encode_to_vec<B: ByteOrder>(image: &RgbImage) -> Vec<u8> {
    let mut v = vec![0; image.as_raw().len() / 3 * 2];

    for (chunk, pixel) in v.chunks_exact_mut(2).zip(image.pixels()) {
        B::write_u16(chunk, rgb888_to_rgb565(pixel.0));
    }

    v
}
