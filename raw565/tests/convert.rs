use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage, Rgba, RgbaImage};
use raw565::{
    convert, decode::decode_to_image, encode::encode_to_vec, BigEndian, ConvertError, Converter,
    FilterType, ImageFormat, LittleEndian,
};
use std::{
    fs,
    io::Cursor,
    path::{Path, PathBuf},
};

const FILTERS: [FilterType; 5] = [
    FilterType::Nearest,
    FilterType::Triangle,
    FilterType::CatmullRom,
    FilterType::Gaussian,
    FilterType::Lanczos3,
];

fn encoded(image: DynamicImage, format: ImageOutputFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, format).unwrap();
    out.into_inner()
}

fn png(image: DynamicImage) -> Vec<u8> {
    encoded(image, ImageOutputFormat::Png)
}

fn solid(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    png(RgbImage::from_pixel(width, height, Rgb(color)).into())
}

fn gradient_jpeg(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 128])
    });
    encoded(image.into(), ImageOutputFormat::Jpeg(90))
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("raw565-convert-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn entries(dir: &Path) -> Vec<PathBuf> {
    let mut entries = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect::<Vec<_>>();
    entries.sort();
    entries
}

#[test]
fn white_becomes_all_ones() {
    let raw = convert(&solid(10, 10, [255, 255, 255])[..], 4, 6).unwrap();

    assert_eq!(raw.len(), 2 * 4 * 6);
    assert!(raw.iter().all(|&b| b == 0xFF));
}

#[test]
fn black_becomes_all_zeros() {
    let raw = convert(&solid(3, 7, [0, 0, 0])[..], 5, 5).unwrap();

    assert_eq!(raw, vec![0; 2 * 5 * 5]);
}

#[test]
fn solid_colors_survive_every_filter() {
    let input = solid(31, 17, [248, 0, 0]);

    for filter in FILTERS {
        let raw = Converter::new(12, 9)
            .unwrap()
            .with_filter(filter)
            .convert::<BigEndian>(&input[..])
            .unwrap();

        assert_eq!(raw.len(), 2 * 12 * 9);
        for pixel in raw.chunks_exact(2) {
            assert_eq!(pixel, [0xF8, 0x00], "{filter:?}");
        }
    }
}

#[test]
fn single_pixel_target() {
    let raw = convert(&solid(8, 8, [0x12, 0x34, 0x56])[..], 1, 1).unwrap();

    // 0x12 & 0xF8 = 0x10, 0x34 & 0xFC = 0x34, 0x56 >> 3 = 0x0A
    assert_eq!(raw, [0x11, 0xAA]);
}

#[test]
fn pixels_are_row_major() {
    let image = RgbImage::from_vec(
        3,
        2,
        vec![
            255, 0, 0, 0, 255, 0, 0, 0, 255, // row 0
            255, 255, 255, 0, 0, 0, 248, 252, 0, // row 1
        ],
    )
    .unwrap();

    let raw = Converter::new(3, 2)
        .unwrap()
        .with_filter(FilterType::Nearest)
        .convert::<BigEndian>(&png(image.into())[..])
        .unwrap();

    assert_eq!(
        raw,
        [
            0xF8, 0x00, 0x07, 0xE0, 0x00, 0x1F, // row 0
            0xFF, 0xFF, 0x00, 0x00, 0xFF, 0xE0, // row 1
        ]
    );
}

#[test]
fn alpha_is_discarded() {
    let image = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 0]));

    let raw = Converter::new(2, 2)
        .unwrap()
        .with_filter(FilterType::Nearest)
        .convert::<BigEndian>(&png(image.into())[..])
        .unwrap();

    assert_eq!(raw, [0x00, 0x1F, 0x00, 0x1F, 0x00, 0x1F, 0x00, 0x1F]);
}

#[test]
fn jpeg_to_display_size() {
    let input = gradient_jpeg(64, 48);

    let raw = convert(&input[..], 240, 320).unwrap();

    assert_eq!(raw.len(), 153_600);
}

#[test]
fn conversion_is_deterministic() {
    let input = gradient_jpeg(100, 75);

    let first = convert(&input[..], 240, 320).unwrap();
    let second = convert(&input[..], 240, 320).unwrap();

    assert_eq!(first, second);
}

#[test]
fn little_endian_swaps_bytes() {
    let input = gradient_jpeg(40, 40);
    let converter = Converter::new(16, 16).unwrap();

    let be = converter.convert::<BigEndian>(&input[..]).unwrap();
    let le = converter.convert::<LittleEndian>(&input[..]).unwrap();

    for (be, le) in be.chunks_exact(2).zip(le.chunks_exact(2)) {
        assert_eq!(be, [le[1], le[0]]);
    }
}

#[test]
fn writer_output_matches_buffer() {
    let input = gradient_jpeg(50, 30);
    let converter = Converter::new(20, 10).unwrap();

    let mut streamed = Vec::new();
    let written = converter
        .convert_to_writer::<BigEndian, _>(&input[..], &mut streamed)
        .unwrap();

    assert_eq!(written, 400);
    assert_eq!(streamed, converter.convert::<BigEndian>(&input[..]).unwrap());
}

#[test]
fn forced_format_must_match() {
    let input = solid(4, 4, [1, 2, 3]);

    let err = Converter::new(4, 4)
        .unwrap()
        .with_format(ImageFormat::Jpeg)
        .convert::<BigEndian>(&input[..])
        .unwrap_err();
    assert!(matches!(err, ConvertError::Decode { .. }));

    Converter::new(4, 4)
        .unwrap()
        .with_format(ImageFormat::Png)
        .convert::<BigEndian>(&input[..])
        .unwrap();
}

#[test]
fn file_output_matches_memory() {
    let dir = scratch_dir("file");
    let input_path = dir.join("logo.jpg");
    let output_path = dir.join("logo.raw");
    fs::write(&input_path, gradient_jpeg(80, 60)).unwrap();

    let converter = Converter::default();
    let written = converter
        .convert_to_file::<BigEndian>(input_path.as_path(), &output_path)
        .unwrap();

    let raw = fs::read(&output_path).unwrap();
    assert_eq!(written, 153_600);
    assert_eq!(raw.len(), 153_600);
    assert_eq!(
        raw,
        converter.convert::<BigEndian>(input_path.as_path()).unwrap()
    );
    assert_eq!(entries(&dir), [input_path, output_path]);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn non_image_leaves_no_output() {
    let dir = scratch_dir("not-an-image");
    let input_path = dir.join("notes.txt");
    let output_path = dir.join("notes.raw");
    fs::write(&input_path, "this is not a picture").unwrap();

    let err = Converter::default()
        .convert_to_file::<BigEndian>(input_path.as_path(), &output_path)
        .unwrap_err();

    assert!(matches!(err, ConvertError::Decode { .. }));
    assert_eq!(entries(&dir), [input_path]);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn failed_conversion_keeps_previous_output() {
    let dir = scratch_dir("keep-previous");
    let input_path = dir.join("broken.jpg");
    let output_path = dir.join("logo.raw");
    fs::write(&input_path, &gradient_jpeg(30, 30)[..100]).unwrap();
    fs::write(&output_path, [0xAB; 4]).unwrap();

    let err = Converter::new(1, 2)
        .unwrap()
        .convert_to_file::<BigEndian>(input_path.as_path(), &output_path)
        .unwrap_err();

    assert!(matches!(err, ConvertError::Decode { .. }));
    assert_eq!(fs::read(&output_path).unwrap(), [0xAB; 4]);
    assert_eq!(entries(&dir), [input_path, output_path]);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn unwritable_destination_is_a_write_error() {
    let dir = scratch_dir("unwritable");
    let output_path = dir.join("missing").join("logo.raw");

    let err = Converter::new(2, 2)
        .unwrap()
        .convert_to_file::<BigEndian>(&solid(2, 2, [9, 9, 9])[..], &output_path)
        .unwrap_err();

    assert!(matches!(err, ConvertError::Write { .. }));
    assert!(entries(&dir).is_empty());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn preview_reproduces_the_stream() {
    let raw = convert(&gradient_jpeg(64, 64)[..], 32, 24).unwrap();

    let preview = decode_to_image::<BigEndian>(&raw, 32, 24).unwrap();

    assert_eq!(preview.dimensions(), (32, 24));
    assert_eq!(encode_to_vec::<BigEndian>(&preview), raw);
}
