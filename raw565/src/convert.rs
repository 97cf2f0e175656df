use crate::{
    encode::{self, EncodeError},
    output::AtomicFile,
    DEFAULT_HEIGHT, DEFAULT_WIDTH,
};
use byteorder::{BigEndian, ByteOrder};
use image::{
    imageops::FilterType, io::Reader, DynamicImage, ImageError, ImageFormat, ImageResult, RgbImage,
};
use log::debug;
use snafu::{ensure, ResultExt, Snafu};
use std::{
    fmt,
    io::{BufRead, Cursor, Seek, Write},
    path::{Path, PathBuf},
};

/// Errors of a conversion. Both `Encode` and `Write` mean the output could not be written.
#[derive(Debug, Snafu)]
pub enum ConvertError {
    #[snafu(display("failed to decode {input}"))]
    Decode { input: String, source: ImageError },
    #[snafu(display("invalid target dimensions {width}x{height}"))]
    InvalidDimensions { width: u32, height: u32 },
    #[snafu(display("failed to write raw stream"))]
    Encode { source: EncodeError },
    #[snafu(display("failed to write `{}`", path.display()))]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Where the encoded source image comes from.
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    Path(&'a Path),
    Bytes(&'a [u8]),
}

impl fmt::Display for Source<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Path(path) => write!(f, "`{}`", path.display()),
            Source::Bytes(bytes) => write!(f, "{}-byte in-memory image", bytes.len()),
        }
    }
}

impl<'a> From<&'a Path> for Source<'a> {
    fn from(path: &'a Path) -> Self {
        Source::Path(path)
    }
}

impl<'a> From<&'a [u8]> for Source<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Source::Bytes(bytes)
    }
}

/// Converts an image into a big-endian raw RGB565 stream of exactly `width * height` pixels, using
/// the default bilinear filter.
pub fn convert<'a>(
    source: impl Into<Source<'a>>,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, ConvertError> {
    Converter::new(width, height)?.convert::<BigEndian>(source)
}

/// Decode, resize and pack settings for one target display.
#[derive(Debug, Clone, Copy)]
pub struct Converter {
    width: u32,
    height: u32,
    filter: FilterType,
    format: Option<ImageFormat>,
}

impl Default for Converter {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            filter: FilterType::Triangle,
            format: None,
        }
    }
}

impl Converter {
    /// Target dimensions are checked here, before anything gets decoded.
    pub fn new(width: u32, height: u32) -> Result<Self, ConvertError> {
        ensure!(
            width > 0 && height > 0 && crate::raw_len(width, height).is_some(),
            InvalidDimensionsSnafu { width, height }
        );

        Ok(Self {
            width,
            height,
            ..Self::default()
        })
    }

    /// Resampling filter used to reach the target dimensions.
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    /// Forces the input format instead of guessing it from the content.
    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn filter(&self) -> FilterType {
        self.filter
    }

    /// Size of every stream this converter produces.
    pub fn output_len(&self) -> usize {
        2 * self.width as usize * self.height as usize
    }

    /// Decodes `source`, resizes it to the target dimensions (ignoring the aspect ratio) and drops
    /// any alpha channel.
    pub fn load<'a>(&self, source: impl Into<Source<'a>>) -> Result<RgbImage, ConvertError> {
        let source = source.into();
        let image = self.decode(source).context(DecodeSnafu {
            input: source.to_string(),
        })?;

        debug!(
            "decoded {source}: {}x{} {:?}",
            image.width(),
            image.height(),
            image.color()
        );
        debug!(
            "resizing to {}x{} with {:?}",
            self.width, self.height, self.filter
        );

        Ok(image
            .resize_exact(self.width, self.height, self.filter)
            .into_rgb8())
    }

    /// Converts `source` into a raw stream in memory.
    pub fn convert<'a, B: ByteOrder>(
        &self,
        source: impl Into<Source<'a>>,
    ) -> Result<Vec<u8>, ConvertError> {
        let image = self.load(source)?;
        Ok(encode::encode_to_vec::<B>(&image))
    }

    /// Converts `source` and streams the result into `w`. Returns the number of bytes written.
    ///
    /// Decoding finishes before the first byte is written.
    pub fn convert_to_writer<'a, B, W>(
        &self,
        source: impl Into<Source<'a>>,
        w: W,
    ) -> Result<usize, ConvertError>
    where
        B: ByteOrder,
        W: Write,
    {
        let image = self.load(source)?;
        encode::encode_image::<B, W>(&image, w).context(EncodeSnafu)
    }

    /// Converts `source` into the file at `output`. Returns the number of bytes written.
    ///
    /// The file only appears once the complete stream has been written. On any error `output` is
    /// left as it was, and no temporary files remain.
    pub fn convert_to_file<'a, B: ByteOrder>(
        &self,
        source: impl Into<Source<'a>>,
        output: impl AsRef<Path>,
    ) -> Result<usize, ConvertError> {
        let output = output.as_ref();
        let image = self.load(source)?;

        let mut file = AtomicFile::create(output).context(WriteSnafu { path: output })?;
        let written = encode::encode_image::<B, _>(&image, &mut file).context(EncodeSnafu)?;
        file.commit().context(WriteSnafu { path: output })?;

        debug!("wrote {written} bytes to `{}`", output.display());

        Ok(written)
    }

    fn decode(&self, source: Source<'_>) -> ImageResult<DynamicImage> {
        match source {
            Source::Path(path) => self.read(Reader::open(path)?),
            Source::Bytes(bytes) => self.read(Reader::new(Cursor::new(bytes))),
        }
    }

    fn read<R: BufRead + Seek>(&self, mut reader: Reader<R>) -> ImageResult<DynamicImage> {
        match self.format {
            Some(format) => reader.set_format(format),
            None => reader = reader.with_guessed_format()?,
        }

        reader.decode()
    }
}
