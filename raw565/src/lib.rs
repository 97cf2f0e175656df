//! Converts images into raw RGB565 frame buffer dumps.
//!
//! The output is meant to be copied verbatim onto the filesystem of a microcontroller driving an
//! SPI TFT panel (e.g. an ILI9341 at 240x320). The firmware reads the file front to back and blits
//! every 16-bit value straight into display RAM, so the format carries nothing but pixels.
//!
//! # Stream format
//!
//! ```plain
//! .- pixel (x, y) at byte offset 2 * (y * width + x) -.
//! |         Byte[0]         |         Byte[1]         |
//! |  7  6  5  4  3  2  1  0 |  7  6  5  4  3  2  1  0 |
//! |----------------+--------+--------+----------------|
//! |       red      |     green       |      blue      |
//! `---------------------------------------------------`
//! ```
//!
//! - no magic, no header, no footer
//! - `width * height` pixels in row-major order (all of row 0, then row 1, ...)
//! - every pixel is one RGB565 `u16`, big-endian by default
//! - total length is exactly `2 * width * height` bytes
//!
//! Channels are packed by truncation, see [`utils::rgb888_to_rgb565`].
//!
//! # Resampling
//!
//! Source images are resized to the target dimensions with a bilinear filter
//! ([`FilterType::Triangle`]) unless another one is chosen. Exact pixel values after resizing
//! depend on the filter; only the packing step is bit-exact.

pub mod convert;
pub mod decode;
pub mod encode;
pub mod output;
pub mod utils;

pub use byteorder::{BigEndian, ByteOrder, LittleEndian};
pub use convert::{convert, ConvertError, Converter, Source};
pub use image::{imageops::FilterType, ImageFormat};

/// Dimensions of the ILI9341 panel the format was first used with.
pub const DEFAULT_WIDTH: u32 = 240;
pub const DEFAULT_HEIGHT: u32 = 320;

/// Size in bytes of a raw stream of the given dimensions, or `None` if it doesn't fit in `usize`.
#[inline]
pub fn raw_len(width: u32, height: u32) -> Option<usize> {
    usize::try_from(width)
        .ok()?
        .checked_mul(usize::try_from(height).ok()?)?
        .checked_mul(2)
}
