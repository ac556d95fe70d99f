//! Pixel normalisation: raw image samples → canonical RGBA.

use crate::document::{ColorSpace, RawImageObject};
use crate::error::PageError;

/// Alpha written for every pixel of an RGB24 source.
pub const OPAQUE: u8 = 255;

/// A 4-channel RGBA pixel buffer, `pixels.len() == width * height * 4`.
#[derive(Clone, PartialEq, Eq)]
pub struct CanonicalImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl std::fmt::Debug for CanonicalImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanonicalImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pixels", &format_args!("<{} bytes>", self.pixels.len()))
            .finish()
    }
}

/// Convert a raw image to canonical RGBA.
///
/// * `Rgba32` samples are copied as-is.
/// * `Rgb24` samples are expanded pixel by pixel, appending [`OPAQUE`].
/// * Anything else fails with [`PageError::UnsupportedColorSpace`].
///
/// A sample buffer shorter than the declared size fails with
/// [`PageError::ImageDecodeFailure`]; bytes past the declared size are ignored.
pub fn normalize(raw: &RawImageObject, page: usize) -> Result<CanonicalImage, PageError> {
    let pixel_count = raw.width as usize * raw.height as usize;

    let (bpp, expand) = match &raw.color_space {
        ColorSpace::Rgb24 => (3, true),
        ColorSpace::Rgba32 => (4, false),
        ColorSpace::Unsupported(tag) => {
            return Err(PageError::UnsupportedColorSpace {
                page,
                color_space: tag.clone(),
            })
        }
    };

    let expected = pixel_count * bpp;
    if raw.samples.len() < expected {
        return Err(PageError::ImageDecodeFailure {
            page,
            detail: format!(
                "{}x{} {} image has {} sample bytes, expected {}",
                raw.width,
                raw.height,
                raw.color_space,
                raw.samples.len(),
                expected
            ),
        });
    }
    let samples = &raw.samples[..expected];

    let pixels = if expand {
        let mut rgba = Vec::with_capacity(pixel_count * 4);
        for px in samples.chunks_exact(3) {
            rgba.extend_from_slice(px);
            rgba.push(OPAQUE);
        }
        rgba
    } else {
        samples.to_vec()
    };

    Ok(CanonicalImage {
        width: raw.width,
        height: raw.height,
        pixels,
    })
}
