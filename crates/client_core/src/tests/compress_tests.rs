use super::*;
use crate::test_support::sample_png;

const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];

#[test]
fn small_image_is_reencoded_as_jpeg() {
    let png = sample_png(32, 24);
    let jpeg = JpegCompressor
        .compress(&png, DEFAULT_MAX_UPLOAD_BYTES)
        .expect("compress");
    assert_eq!(&jpeg[..3], &JPEG_MAGIC);

    let decoded = image::load_from_memory(&jpeg).expect("decode");
    assert_eq!((decoded.width(), decoded.height()), (32, 24));
}

#[test]
fn output_respects_byte_limit() {
    let png = sample_png(256, 256);
    let limit = 4_000;
    let jpeg = JpegCompressor.compress(&png, limit).expect("compress");
    assert!(jpeg.len() <= limit, "got {} bytes", jpeg.len());
    assert_eq!(&jpeg[..3], &JPEG_MAGIC);
}

#[test]
fn tight_limit_shrinks_dimensions() {
    let png = sample_png(512, 512);
    let jpeg = JpegCompressor.compress(&png, 1_500).expect("compress");
    let decoded = image::load_from_memory(&jpeg).expect("decode");
    assert!(decoded.width() < 512);
    assert!(jpeg.len() <= 1_500);
}

#[test]
fn impossible_limit_is_reported() {
    let png = sample_png(8, 8);
    assert!(matches!(
        JpegCompressor.compress(&png, 10),
        Err(CompressError::TooLarge { max_bytes: 10 })
    ));
}

#[test]
fn garbage_bytes_fail_to_decode() {
    assert!(matches!(
        JpegCompressor.compress(b"definitely not an image", DEFAULT_MAX_UPLOAD_BYTES),
        Err(CompressError::Decode(_))
    ));
}
