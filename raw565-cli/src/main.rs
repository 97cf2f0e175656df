use argh::FromArgs;
use image::ImageFormat;
use log::debug;
use raw565::{
    decode::decode_to_image, BigEndian, Converter, FilterType, LittleEndian, DEFAULT_HEIGHT,
    DEFAULT_WIDTH,
};
use std::{error::Error, path::Path, process::ExitCode, str::FromStr};

/// Raw RGB565 converter for SPI displays.
#[derive(FromArgs)]
struct Cli {
    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Convert(Convert),
    Preview(Preview),
}

/// Converts an image into a raw RGB565 frame buffer dump.
#[derive(FromArgs)]
#[argh(subcommand, name = "convert")]
struct Convert {
    /// target width in pixels (default: 240)
    #[argh(option, default = "DEFAULT_WIDTH")]
    width: u32,
    /// target height in pixels (default: 320)
    #[argh(option, default = "DEFAULT_HEIGHT")]
    height: u32,
    /// resampling filter (nearest, triangle, catmull-rom, gaussian, lanczos3; default: triangle)
    #[argh(option, default = "Filter(FilterType::Triangle)")]
    filter: Filter,
    /// input format, optional (png, jpg, bmp, tiff). Guessed from the content if not set.
    #[argh(option)]
    format: Option<Format>,
    /// write pixels little-endian instead of big-endian
    #[argh(switch)]
    little_endian: bool,

    /// the input image
    #[argh(positional)]
    input: String,
    /// the raw output file
    #[argh(positional)]
    output: String,
}

/// Renders a raw RGB565 dump back into a regular image.
#[derive(FromArgs)]
#[argh(subcommand, name = "preview")]
struct Preview {
    /// width of the raw image in pixels (default: 240)
    #[argh(option, default = "DEFAULT_WIDTH")]
    width: u32,
    /// height of the raw image in pixels (default: 320)
    #[argh(option, default = "DEFAULT_HEIGHT")]
    height: u32,
    /// output format (png, jpg, bmp, tiff)
    #[argh(option)]
    format: Format,
    /// read pixels as little-endian instead of big-endian
    #[argh(switch)]
    little_endian: bool,

    /// the raw input file
    #[argh(positional)]
    input: String,
    /// the output image
    #[argh(positional)]
    output: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Format(ImageFormat);

impl FromStr for Format {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        #[rustfmt::skip]
        let Some(format) = s.eq_ignore_ascii_case("png").then_some(ImageFormat::Png)
               .or_else(|| s.eq_ignore_ascii_case("jpg").then_some(ImageFormat::Jpeg))
               .or_else(|| s.eq_ignore_ascii_case("jpeg").then_some(ImageFormat::Jpeg))
               .or_else(|| s.eq_ignore_ascii_case("bmp").then_some(ImageFormat::Bmp))
               .or_else(|| s.eq_ignore_ascii_case("tiff").then_some(ImageFormat::Tiff))
        else { return Err("invalid format, expected png, jpg, bmp or tiff"); };

        Ok(Format(format))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Filter(FilterType);

impl FromStr for Filter {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        #[rustfmt::skip]
        let Some(filter) = s.eq_ignore_ascii_case("nearest").then_some(FilterType::Nearest)
               .or_else(|| s.eq_ignore_ascii_case("triangle").then_some(FilterType::Triangle))
               .or_else(|| s.eq_ignore_ascii_case("bilinear").then_some(FilterType::Triangle))
               .or_else(|| s.eq_ignore_ascii_case("catmull-rom").then_some(FilterType::CatmullRom))
               .or_else(|| s.eq_ignore_ascii_case("bicubic").then_some(FilterType::CatmullRom))
               .or_else(|| s.eq_ignore_ascii_case("gaussian").then_some(FilterType::Gaussian))
               .or_else(|| s.eq_ignore_ascii_case("lanczos3").then_some(FilterType::Lanczos3))
        else { return Err("invalid filter, expected nearest, triangle, catmull-rom, gaussian or lanczos3"); };

        Ok(Filter(filter))
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let Cli { command } = argh::from_env();

    let result = match command {
        Command::Convert(options) => convert(options),
        Command::Preview(options) => preview(options),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!("{e:?}");
            eprintln!("error: {}", report(e.as_ref()));
            ExitCode::FAILURE
        }
    }
}

/// Formats an error together with its chain of sources.
fn report(e: &dyn Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(e) = source {
        message.push_str(": ");
        message.push_str(&e.to_string());
        source = e.source();
    }
    message
}

fn convert(options: Convert) -> Result<(), Box<dyn Error>> {
    let Convert {
        width,
        height,
        filter: Filter(filter),
        format,
        little_endian,
        input,
        output,
    } = options;

    let mut converter = Converter::new(width, height)?.with_filter(filter);
    if let Some(Format(format)) = format {
        converter = converter.with_format(format);
    }
    debug!("{converter:?}");

    let input_path = Path::new(&input);
    let written = if little_endian {
        converter.convert_to_file::<LittleEndian>(input_path, &output)?
    } else {
        converter.convert_to_file::<BigEndian>(input_path, &output)?
    };

    println!("Converted `{input}` to `{output}` ({width}x{height}, {written} bytes)");

    Ok(())
}

fn preview(options: Preview) -> Result<(), Box<dyn Error>> {
    let Preview {
        width,
        height,
        format: Format(format),
        little_endian,
        input,
        output,
    } = options;

    let raw = std::fs::read(&input).map_err(|e| format!("failed to read `{input}`: {e}"))?;

    println!("Decoding `{input}`");

    let image = if little_endian {
        decode_to_image::<LittleEndian>(&raw, width, height)?
    } else {
        decode_to_image::<BigEndian>(&raw, width, height)?
    };

    image.save_with_format(&output, format)?;

    println!("Written {width}x{height} image to `{output}`");

    Ok(())
}
