//! Eager (full-document) extraction entry points.
//!
//! ## Why eager vs. streaming?
//!
//! This module provides the simpler API: walk every page, then return one
//! [`ExtractionResult`]. Use [`crate::stream::extract_stream`] instead when
//! pages should be consumed as they are produced.
//!
//! The only fatal document failure is an unreadable document. It is reported
//! before any page is touched, so there is never a partial result.

use crate::config::ExtractionConfig;
use crate::document::{open_document, Document};
use crate::error::ExtractError;
use crate::output::{DocumentInfo, ExtractionResult};
use crate::pipeline::aggregate::ResultAggregator;
use crate::pipeline::input;
use crate::scheduler::PageScheduler;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Extract text and images from PDF bytes.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// * [`ExtractError::DocumentUnreadable`]: the bytes are not a readable PDF.
///   Its message is always "Could not read the document. Check that it is
///   not corrupted.".
/// * [`ExtractError::InvalidConfig`]: `config` fails validation.
///
/// Page-level problems (unreadable text, unsupported images) never fail the
/// call; the affected page simply contributes less.
pub async fn extract(
    bytes: &[u8],
    config: &ExtractionConfig,
) -> Result<ExtractionResult, ExtractError> {
    config.validate()?;
    let document = open_document(bytes).inspect_err(|e| debug!("Open failed: {}", e))?;
    extract_document(document, config).await
}

/// Extract from an already-opened document.
///
/// Use this with a custom [`Document`] implementation, or pass `&doc` to keep
/// ownership of a [`crate::PdfDocument`].
pub async fn extract_document<D: Document>(
    document: D,
    config: &ExtractionConfig,
) -> Result<ExtractionResult, ExtractError> {
    config.validate()?;
    let start = Instant::now();

    let mut scheduler = PageScheduler::new(document, config.clone());
    let mut aggregator = ResultAggregator::new(&config.page_marker, scheduler.total_pages());

    while let Some(page) = scheduler.next_page().await {
        aggregator.push_page(page);
    }

    let result = aggregator.finish();
    info!(
        "Extracted {} pages, {} chars, {} images in {}ms",
        result.page_count,
        result.text.len(),
        result.images.len(),
        start.elapsed().as_millis()
    );
    Ok(result)
}

/// Extract from a local file path or an HTTP/HTTPS URL.
pub async fn extract_input(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<ExtractionResult, ExtractError> {
    let input_str = input_str.as_ref();
    config.validate()?;
    info!("Starting extraction: {}", input_str);

    let bytes = input::resolve_input(input_str, config.download_timeout_secs).await?;
    extract(&bytes, config).await
}

/// Extract from a path or URL and write the result to `output_path` as JSON.
///
/// The file is written to a temporary sibling and renamed into place, so a
/// reader never sees a half-written result.
pub async fn extract_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionResult, ExtractError> {
    let result = extract_input(input_str, config).await?;
    write_json_atomic(output_path.as_ref(), &result).await?;
    Ok(result)
}

/// Blocking wrapper around [`extract`] for non-async callers.
///
/// Creates its own runtime; do not call from inside an async context.
pub fn extract_sync(
    bytes: &[u8],
    config: &ExtractionConfig,
) -> Result<ExtractionResult, ExtractError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ExtractError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract(bytes, config))
}

/// Read page count and PDF version without extracting anything.
pub async fn inspect(input_str: impl AsRef<str>) -> Result<DocumentInfo, ExtractError> {
    let timeout = ExtractionConfig::default().download_timeout_secs;
    let bytes = input::resolve_input(input_str.as_ref(), timeout).await?;
    let document = open_document(&bytes)?;
    Ok(DocumentInfo {
        page_count: document.page_count(),
        pdf_version: document.version().to_string(),
    })
}

/// Serialize `result` and move it into place with a rename.
pub(crate) async fn write_json_atomic(
    path: &Path,
    result: &ExtractionResult,
) -> Result<(), ExtractError> {
    let json = serde_json::to_vec_pretty(result)
        .map_err(|e| ExtractError::Internal(format!("Failed to serialize result: {}", e)))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ExtractError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
    }

    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, &json)
        .await
        .map_err(|e| ExtractError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| ExtractError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    debug!("Wrote {} bytes to {}", json.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DOCUMENT_UNREADABLE_MESSAGE;

    #[tokio::test]
    async fn garbage_bytes_are_unreadable() {
        let err = extract(b"definitely not a pdf", &ExtractionConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::DocumentUnreadable { .. }));
        assert_eq!(err.to_string(), DOCUMENT_UNREADABLE_MESSAGE);
    }

    #[tokio::test]
    async fn empty_bytes_are_unreadable() {
        let err = extract(&[], &ExtractionConfig::default()).await.unwrap_err();
        assert!(matches!(err, ExtractError::DocumentUnreadable { .. }));
    }

    #[tokio::test]
    async fn invalid_config_is_rejected_before_parsing() {
        let mut config = ExtractionConfig::default();
        config.page_marker = "no placeholder".into();
        let err = extract(b"garbage", &config).await.unwrap_err();
        assert!(matches!(err, ExtractError::InvalidConfig(_)));
    }

    #[test]
    fn sync_wrapper_reports_errors() {
        let err = extract_sync(b"%PDF-", &ExtractionConfig::default()).unwrap_err();
        assert!(matches!(err, ExtractError::DocumentUnreadable { .. }));
    }

    #[tokio::test]
    async fn atomic_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.json");
        let result = ExtractionResult {
            text: "\n--- Page 1 ---\nhi".into(),
            page_count: 1,
            images: vec![],
        };
        write_json_atomic(&path, &result).await.unwrap();

        let back: ExtractionResult =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(back, result);
        assert!(!path.with_extension("json.tmp").exists());
    }
}
