//! Error types for the edgequake-pdf-extract library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ExtractError`]: **Fatal**. The extraction cannot proceed at all
//!   (the document cannot be opened, the input cannot be found, the
//!   configuration is invalid). Returned as `Err(ExtractError)` from the
//!   top-level `extract*` functions. No partial result accompanies it.
//!
//! * [`PageError`]: **Non-fatal**. A single page or a single image could not
//!   be processed. It is logged, reported to the progress callback, and the
//!   page simply contributes less to the result. It never crosses the public
//!   `extract*` boundary.
//!
//! [`DocumentError`] is what a [`crate::document::Document`] implementation
//! reports for one page or object; the scheduler maps it onto a `PageError`.

use std::path::PathBuf;
use thiserror::Error;

/// The stable, user-facing message for an unreadable document.
pub const DOCUMENT_UNREADABLE_MESSAGE: &str =
    "Could not read the document. Check that it is not corrupted.";

/// All fatal errors returned by the edgequake-pdf-extract library.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Document errors ───────────────────────────────────────────────────
    /// The document bytes could not be opened as a PDF.
    ///
    /// The display message is stable; the underlying reason is available
    /// through [`std::error::Error::source`].
    #[error("Could not read the document. Check that it is not corrupted.")]
    DocumentUnreadable {
        #[from]
        source: DocumentCorrupt,
    },

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// The original cause attached to [`ExtractError::DocumentUnreadable`].
#[derive(Debug, Clone, Error)]
#[error("document is corrupt or not a PDF: {detail}")]
pub struct DocumentCorrupt {
    pub detail: String,
}

/// A failure reported by a document backend for one page or object.
#[derive(Debug, Clone, Error)]
pub enum DocumentError {
    /// Page number outside `1..=page_count`.
    #[error("page {page} does not exist (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    /// A content stream or dictionary could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// A referenced object is missing or has the wrong type.
    #[error("missing object: {0}")]
    MissingObject(String),

    /// Stream data could not be decompressed or decoded.
    #[error("decode error: {0}")]
    Decode(String),
}

/// A non-fatal error for a single page or a single image on that page.
///
/// The extraction continues; the page contributes less text or fewer images.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// The page's text content could not be read. The page text is empty.
    #[error("Page {page}: text extraction failed: {detail}")]
    TextFailure { page: usize, detail: String },

    /// The page's operator list could not be parsed. No images from this page.
    #[error("Page {page}: image scan failed: {detail}")]
    ImageScanFailure { page: usize, detail: String },

    /// One image uses a colour space other than RGB24 / RGBA32.
    #[error("Page {page}: unsupported colour space '{color_space}', image skipped")]
    UnsupportedColorSpace { page: usize, color_space: String },

    /// One image object could not be fetched or its samples are malformed.
    #[error("Page {page}: image decode failed: {detail}")]
    ImageDecodeFailure { page: usize, detail: String },

    /// One image could not be compressed.
    #[error("Page {page}: image encoding failed: {detail}")]
    EncodeFailure { page: usize, detail: String },
}

impl PageError {
    /// 1-indexed page the error belongs to.
    pub fn page(&self) -> usize {
        match self {
            PageError::TextFailure { page, .. }
            | PageError::ImageScanFailure { page, .. }
            | PageError::UnsupportedColorSpace { page, .. }
            | PageError::ImageDecodeFailure { page, .. }
            | PageError::EncodeFailure { page, .. } => *page,
        }
    }
}
