//! Canonical re-encoding of every image that enters a slot.
//!
//! Whatever the provenance (camera bitmap, uploaded PNG/WebP/JPEG, or an
//! image that was already normalized), the source is decoded at its native
//! size, composited onto an opaque black canvas of the same size, and
//! encoded as JPEG at a fixed quality. The step is never skipped for input
//! that is already JPEG, so output format and quality never depend on the
//! capture path.

use crate::types::{EncodedImage, ImageSource};
use image::codecs::jpeg::JpegEncoder;
use image::{imageops, DynamicImage, Rgba, RgbaImage, RgbImage};
use thiserror::Error;

/// JPEG quality factor (0.9 on a 0..1 scale).
pub const JPEG_QUALITY: u8 = 90;

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("invalid image: {0}")]
    InvalidImage(String),
    #[error("JPEG encoding failed: {0}")]
    Encode(String),
}

/// Decode `source` and re-encode it as canonical JPEG.
pub fn normalize(source: &ImageSource) -> Result<EncodedImage, NormalizeError> {
    let decoded = decode(source)?;
    let (width, height) = (decoded.width(), decoded.height());
    if width == 0 || height == 0 {
        return Err(NormalizeError::InvalidImage(format!(
            "empty image ({width}x{height})"
        )));
    }

    let canvas = render_on_canvas(&decoded);

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY)
        .encode_image(&canvas)
        .map_err(|e| NormalizeError::Encode(e.to_string()))?;

    tracing::debug!(
        source = source.kind(),
        width,
        height,
        bytes = bytes.len(),
        "normalized image"
    );

    Ok(EncodedImage::new(bytes, width, height))
}

fn decode(source: &ImageSource) -> Result<DynamicImage, NormalizeError> {
    match source {
        ImageSource::Frame(frame) => {
            let Some(expected) = frame.expected_len() else {
                return Err(NormalizeError::InvalidImage(format!(
                    "frame dimensions {}x{} are too large",
                    frame.width, frame.height
                )));
            };
            if frame.data.len() != expected {
                return Err(NormalizeError::InvalidImage(format!(
                    "frame buffer is {} bytes, expected {expected} for {}x{}",
                    frame.data.len(),
                    frame.width,
                    frame.height
                )));
            }
            RgbImage::from_raw(frame.width, frame.height, frame.data.clone())
                .map(DynamicImage::ImageRgb8)
                .ok_or_else(|| NormalizeError::InvalidImage("frame buffer too small".into()))
        }
        ImageSource::File(bytes) => decode_bytes(bytes),
        ImageSource::Encoded(image) => decode_bytes(image.bytes()),
    }
}

fn decode_bytes(bytes: &[u8]) -> Result<DynamicImage, NormalizeError> {
    if bytes.is_empty() {
        return Err(NormalizeError::InvalidImage("no image data".into()));
    }
    image::load_from_memory(bytes).map_err(|e| NormalizeError::InvalidImage(e.to_string()))
}

/// Draw the image unscaled onto an opaque black canvas of the same size.
/// Transparent regions come out black, the way a browser canvas exports them.
fn render_on_canvas(image: &DynamicImage) -> RgbImage {
    let mut canvas = RgbaImage::from_pixel(image.width(), image.height(), Rgba([0, 0, 0, 255]));
    imageops::overlay(&mut canvas, &image.to_rgba8(), 0, 0);
    DynamicImage::ImageRgba8(canvas).to_rgb8()
}
