//! Image encoding: canonical RGBA → base64 JPEG data URL.
//!
//! Extracted images are destined for indexing and display, not pixel-exact
//! archival, so a lossy JPEG at quality 80 keeps them small. The encoder is
//! deterministic: the same pixels and quality always give the same string,
//! which the fingerprint-based deduplication relies on.
//!
//! JPEG has no alpha channel; the alpha byte of every canonical pixel is
//! dropped before compression.

use crate::output::EncodedImage;
use crate::pipeline::normalize::CanonicalImage;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::error::{ParameterError, ParameterErrorKind};
use image::{ExtendedColorType, ImageEncoder as _, ImageError};
use tracing::debug;

/// Prefix of every encoded image string.
pub const DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

/// Default JPEG quality (0–100).
pub const DEFAULT_QUALITY: u8 = 80;

/// Lossy encoder for canonical pixel buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageEncoder {
    quality: u8,
}

impl Default for ImageEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_QUALITY)
    }
}

impl ImageEncoder {
    /// Quality is clamped to 1–100.
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode an image as a `data:image/jpeg;base64,…` URL.
    pub fn encode(&self, img: &CanonicalImage) -> Result<EncodedImage, ImageError> {
        let pixel_count = img.width as usize * img.height as usize;
        if img.pixels.len() != pixel_count * 4 {
            return Err(ImageError::Parameter(ParameterError::from_kind(
                ParameterErrorKind::DimensionMismatch,
            )));
        }

        let rgb: Vec<u8> = img
            .pixels
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();

        let mut buf = Vec::new();
        JpegEncoder::new_with_quality(&mut buf, self.quality).write_image(
            &rgb,
            img.width,
            img.height,
            ExtendedColorType::Rgb8,
        )?;

        let data = format!("{DATA_URL_PREFIX}{}", STANDARD.encode(&buf));
        debug!(
            "Encoded {}x{} image → {} bytes base64",
            img.width,
            img.height,
            data.len()
        );

        Ok(EncodedImage {
            data,
            width: img.width,
            height: img.height,
        })
    }
}
