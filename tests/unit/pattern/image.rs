use super::*;

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 7, 255])
    });
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
    bytes
}

#[test]
fn decode_png_yields_rgba8_pattern() {
    let pattern = decode_pattern(&png_bytes(4, 3)).unwrap();
    assert_eq!((pattern.width(), pattern.height()), (4, 3));
    assert_eq!(pattern.pixel(2, 1), [2, 1, 7, 255]);
}

#[test]
fn garbage_bytes_fail_to_decode() {
    assert!(decode_pattern(b"definitely not an image").is_err());
}

#[test]
fn zero_sized_buffers_are_rejected() {
    assert!(Pattern::from_rgba8(0, 4, Vec::new()).is_err());
    assert!(Pattern::from_rgba8(4, 0, Vec::new()).is_err());
}

#[test]
fn mismatched_buffer_is_rejected() {
    assert!(Pattern::from_rgba8(2, 2, vec![0; 15]).is_err());
    assert!(Pattern::from_rgba8(2, 2, vec![0; 16]).is_ok());
}

#[test]
fn load_pattern_reports_missing_file() {
    let missing = std::env::temp_dir().join("knitline_no_such_pattern.png");
    let err = load_pattern(&missing).unwrap_err();
    assert!(err.to_string().contains("read pattern"));
}
