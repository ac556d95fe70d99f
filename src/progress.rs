//! Progress-callback trait for per-page extraction events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events as the scheduler walks the document.
//!
//! # Why callbacks instead of channels?
//!
//! A callback is the least-invasive integration point: callers can forward
//! events to a channel, a terminal progress bar or a log without the library
//! knowing how the host application communicates. Callbacks only observe;
//! nothing they do changes the extraction result.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdf_extract::{ExtractionConfig, ExtractionProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     images: AtomicUsize,
//! }
//!
//! impl ExtractionProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, _page: usize, _total: usize, _text_len: usize, images_added: usize) {
//!         self.images.fetch_add(images_added, Ordering::SeqCst);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { images: AtomicUsize::new(0) });
//!
//! let config = ExtractionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ExtractionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the page scheduler as it processes each page.
///
/// Pages are processed one at a time in ascending order, so events for a
/// single run never overlap. Implementations are `Send + Sync` so a config
/// can be shared between runs on different threads. All methods have no-op
/// defaults.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once after the document opened, before page 1.
    fn on_extraction_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called before a page's text and images are read.
    ///
    /// # Arguments
    /// * `page_num`   : 1-indexed page number
    /// * `total_pages`: total pages in the document
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called after a page has been fully processed, errors included.
    ///
    /// # Arguments
    /// * `text_len`    : byte length of the page text
    /// * `images_added`: images this page added to the result
    fn on_page_complete(
        &self,
        page_num: usize,
        total_pages: usize,
        text_len: usize,
        images_added: usize,
    ) {
        let _ = (page_num, total_pages, text_len, images_added);
    }

    /// Called for each recoverable error on a page. May fire several times per page.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once after the last page.
    fn on_extraction_complete(&self, total_pages: usize, image_count: usize) {
        let _ = (total_pages, image_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;
