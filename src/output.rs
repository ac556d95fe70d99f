//! Output types returned by the extraction entry points.

use serde::{Deserialize, Serialize};

/// A compressed image as stored in the result.
///
/// `data` is a `data:image/jpeg;base64,…` URL; it is also what deduplication
/// fingerprints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedImage {
    pub data: String,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    /// The base64 payload without the data-URL prefix.
    pub fn base64(&self) -> &str {
        self.data
            .split_once(',')
            .map(|(_, payload)| payload)
            .unwrap_or(&self.data)
    }
}

/// The aggregated result of one extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Per-page text, each page preceded by its page marker, in page order.
    pub text: String,
    /// Number of pages in the document.
    pub page_count: usize,
    /// Distinct images in first-encountered order, capped.
    pub images: Vec<EncodedImage>,
}

/// What one page contributed, as emitted by the scheduler and the stream API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageExtraction {
    /// 1-indexed page number.
    pub page_num: usize,
    /// Page text (empty when the text could not be read).
    pub text: String,
    /// Images accepted from this page (after size filter, dedup and cap).
    pub images: Vec<EncodedImage>,
}

/// Basic document facts, available without running an extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub page_count: usize,
    pub pdf_version: String,
}
