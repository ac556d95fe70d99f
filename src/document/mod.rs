//! The page-addressable document model consumed by the extraction pipeline.
//!
//! The pipeline never parses PDF syntax itself. It talks to a [`Document`]:
//! something that knows how many pages there are and can hand out, per page,
//! the ordered text runs, the drawing-operator list, and the raw image objects
//! those operators reference. [`PdfDocument`] is the shipped implementation;
//! callers with their own loader can implement the trait and pass it to
//! [`crate::extract_document`].
//!
//! Pages are addressed 1-based everywhere in this crate.

pub mod pdf;

pub use pdf::PdfDocument;

use crate::error::DocumentError;

/// A decoded, page-addressable document.
///
/// Implementations are read-only: extraction borrows the document and never
/// mutates it.
pub trait Document {
    /// Opaque reference to an image object, as produced by
    /// [`Document::operator_list`] and consumed by [`Document::image_object`].
    type ImageHandle;

    /// Number of pages (`>= 0`).
    fn page_count(&self) -> usize;

    /// Ordered text runs of one page's text content.
    fn text_runs(&self, page: usize) -> Result<Vec<String>, DocumentError>;

    /// Ordered drawing operations of one page's content stream.
    fn operator_list(&self, page: usize) -> Result<Vec<DrawOp<Self::ImageHandle>>, DocumentError>;

    /// Resolve the raw image object behind a paint operation.
    fn image_object(
        &self,
        page: usize,
        handle: &Self::ImageHandle,
    ) -> Result<RawImageObject, DocumentError>;
}

impl<D: Document + ?Sized> Document for &D {
    type ImageHandle = D::ImageHandle;

    fn page_count(&self) -> usize {
        (**self).page_count()
    }

    fn text_runs(&self, page: usize) -> Result<Vec<String>, DocumentError> {
        (**self).text_runs(page)
    }

    fn operator_list(&self, page: usize) -> Result<Vec<DrawOp<Self::ImageHandle>>, DocumentError> {
        (**self).operator_list(page)
    }

    fn image_object(
        &self,
        page: usize,
        handle: &Self::ImageHandle,
    ) -> Result<RawImageObject, DocumentError> {
        (**self).image_object(page, handle)
    }
}

/// One entry of a page's drawing-operator list.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp<H> {
    /// Paint an image object. Dimensions are those declared by the object,
    /// known without fetching its samples.
    PaintImage { handle: H, width: u32, height: u32 },
    /// Any other operation (text, paths, state changes).
    Other { operator: String },
}

/// Encoding of a raw image's sample buffer.
///
/// A closed set: adding a supported encoding is a new variant, and every
/// `match` over it has to handle that variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorSpace {
    /// 3 bytes per pixel, R G B.
    Rgb24,
    /// 4 bytes per pixel, R G B A.
    Rgba32,
    /// Anything else, tagged with the name the document used for it.
    Unsupported(String),
}

impl ColorSpace {
    /// Bytes per pixel for supported encodings.
    pub fn bytes_per_pixel(&self) -> Option<usize> {
        match self {
            ColorSpace::Rgb24 => Some(3),
            ColorSpace::Rgba32 => Some(4),
            ColorSpace::Unsupported(_) => None,
        }
    }
}

impl std::fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorSpace::Rgb24 => f.write_str("RGB24"),
            ColorSpace::Rgba32 => f.write_str("RGBA32"),
            ColorSpace::Unsupported(tag) => f.write_str(tag),
        }
    }
}

/// An image object as stored in the document, before normalisation.
#[derive(Clone, PartialEq, Eq)]
pub struct RawImageObject {
    pub width: u32,
    pub height: u32,
    pub color_space: ColorSpace,
    pub samples: Vec<u8>,
}

impl std::fmt::Debug for RawImageObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawImageObject")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("color_space", &self.color_space)
            .field("samples", &format_args!("<{} bytes>", self.samples.len()))
            .finish()
    }
}

/// Open PDF bytes with the default backend.
pub fn open_document(bytes: &[u8]) -> Result<PdfDocument, crate::error::DocumentCorrupt> {
    PdfDocument::open(bytes)
}
