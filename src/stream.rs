//! Streaming extraction API: emit pages as they are processed.
//!
//! ## Why stream?
//!
//! Large documents take a while. A stream lets callers index or display each
//! page as soon as it is done instead of waiting for the whole result.
//!
//! Unlike the eager [`crate::extract::extract`], [`extract_stream`] yields a
//! [`PageExtraction`] per page, in page order. Each item carries only the
//! images newly accepted on that page, so concatenating the items' images
//! gives exactly the eager result's image list. Page markers are not part of
//! the stream items; render them with
//! [`crate::pipeline::aggregate::render_marker`] if needed.

use crate::config::ExtractionConfig;
use crate::document::{open_document, Document};
use crate::error::ExtractError;
use crate::output::PageExtraction;
use crate::scheduler::PageScheduler;
use futures::stream;
use tokio_stream::Stream;
use tracing::info;

/// Open PDF bytes and stream per-page extractions.
///
/// The document is opened eagerly, so an unreadable document fails here
/// rather than mid-stream.
///
/// # Example
/// ```rust,no_run
/// use edgequake_pdf_extract::{extract_stream, ExtractionConfig};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes = std::fs::read("document.pdf")?;
/// let config = ExtractionConfig::default();
/// let pages = extract_stream(&bytes, &config)?;
/// futures::pin_mut!(pages);
/// while let Some(page) = pages.next().await {
///     println!("Page {}: {} chars, {} images", page.page_num, page.text.len(), page.images.len());
/// }
/// # Ok(())
/// # }
/// ```
pub fn extract_stream(
    bytes: &[u8],
    config: &ExtractionConfig,
) -> Result<impl Stream<Item = PageExtraction>, ExtractError> {
    config.validate()?;
    let document = open_document(bytes)?;
    info!("Starting streaming extraction");
    Ok(document_stream(document, config))
}

/// Stream per-page extractions from an already-opened document.
pub fn document_stream<D: Document>(
    document: D,
    config: &ExtractionConfig,
) -> impl Stream<Item = PageExtraction> {
    let scheduler = PageScheduler::new(document, config.clone());
    stream::unfold(scheduler, |mut scheduler| async move {
        let page = scheduler.next_page().await?;
        Some((page, scheduler))
    })
}
