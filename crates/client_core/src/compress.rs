use std::io::Cursor;

use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage, RgbImage};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 1_000_000;

const START_QUALITY: u8 = 100;
const QUALITY_STEP: u8 = 5;
const MIN_QUALITY: u8 = 5;

#[derive(Debug, Error)]
pub enum CompressError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("image cannot be reduced below {max_bytes} bytes")]
    TooLarge { max_bytes: usize },
}

/// Shrinks a selected photo before upload.
pub trait ImageCompressor: Send + Sync {
    /// Returns JPEG bytes no larger than `max_bytes`.
    fn compress(&self, bytes: &[u8], max_bytes: usize) -> Result<Vec<u8>, CompressError>;
}

/// Re-encodes as JPEG, lowering quality first and halving the dimensions
/// once quality is exhausted.
#[derive(Debug, Default, Clone, Copy)]
pub struct JpegCompressor;

impl ImageCompressor for JpegCompressor {
    fn compress(&self, bytes: &[u8], max_bytes: usize) -> Result<Vec<u8>, CompressError> {
        let mut img = image::load_from_memory(bytes)?;
        loop {
            let rgb = img.to_rgb8();
            let mut quality = START_QUALITY;
            loop {
                let encoded = encode_jpeg(&rgb, quality)?;
                if encoded.len() <= max_bytes {
                    debug!(
                        width = rgb.width(),
                        height = rgb.height(),
                        quality,
                        size = encoded.len(),
                        "compress: image fits upload limit"
                    );
                    return Ok(encoded);
                }
                if quality <= MIN_QUALITY {
                    break;
                }
                quality = quality.saturating_sub(QUALITY_STEP).max(MIN_QUALITY);
            }

            if img.width() <= 1 && img.height() <= 1 {
                return Err(CompressError::TooLarge { max_bytes });
            }
            img = downscale(&img);
        }
    }
}

fn encode_jpeg(rgb: &RgbImage, quality: u8) -> Result<Vec<u8>, CompressError> {
    let mut out = Cursor::new(Vec::new());
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, quality))?;
    Ok(out.into_inner())
}

fn downscale(img: &DynamicImage) -> DynamicImage {
    let width = (img.width() / 2).max(1);
    let height = (img.height() / 2).max(1);
    img.resize_exact(width, height, FilterType::Triangle)
}

#[cfg(test)]
#[path = "tests/compress_tests.rs"]
mod tests;
