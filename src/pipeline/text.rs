//! Page text: the page's text runs joined by a single space.

use crate::document::Document;
use crate::error::PageError;
use tracing::debug;

/// Extract the text of one page.
///
/// A page whose text content cannot be read yields
/// [`PageError::TextFailure`]; the caller substitutes an empty body.
pub fn extract_page_text<D: Document>(document: &D, page: usize) -> Result<String, PageError> {
    let runs = document
        .text_runs(page)
        .map_err(|e| PageError::TextFailure {
            page,
            detail: e.to_string(),
        })?;
    debug!("Page {}: {} text runs", page, runs.len());
    Ok(runs.join(" "))
}
