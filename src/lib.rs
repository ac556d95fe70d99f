//! # edgequake-pdf-extract
//!
//! Pull the plain text and the embedded raster images out of a PDF in one
//! pass, ready for indexing or display.
//!
//! ## Why this crate?
//!
//! Downstream consumers (search indexes, chat context builders, document
//! viewers) usually want two things from a PDF: its words, page by page, and
//! its pictures. This crate produces both in one bounded, deterministic
//! result: page-delimited text plus at most 50 deduplicated, JPEG-compressed
//! images, without ever failing the whole document because one page or one
//! image is odd.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF bytes
//!  │
//!  ├─ 1. Open      lopdf parse → Document (the only fatal failure)
//!  ├─ 2. Text      per page: text runs joined by a space
//!  ├─ 3. Resolve   per page: image-paint operators > 100 px on both sides
//!  ├─ 4. Normalize RGB24 / RGBA32 → canonical RGBA
//!  ├─ 5. Encode    JPEG q80 → base64 data URL
//!  ├─ 6. Dedup     fingerprint set, then cap at 50 images
//!  └─ 7. Output    "\n--- Page N ---\n" delimited text + image list
//! ```
//!
//! Pages run strictly in order on the caller's task; the scheduler yields to
//! the runtime every few pages so long documents do not starve other tasks.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf_extract::{extract, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bytes = std::fs::read("document.pdf")?;
//!     let result = extract(&bytes, &ExtractionConfig::default()).await?;
//!     println!("{}", result.text);
//!     eprintln!("{} pages, {} images", result.page_count, result.images.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfextract` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-pdf-extract = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod scheduler;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder};
pub use document::{ColorSpace, Document, DrawOp, PdfDocument, RawImageObject};
pub use error::{DocumentCorrupt, DocumentError, ExtractError, PageError};
pub use extract::{extract, extract_document, extract_input, extract_sync, extract_to_file, inspect};
pub use output::{DocumentInfo, EncodedImage, ExtractionResult, PageExtraction};
pub use pipeline::dedup::{ContentHashFingerprint, FingerprintKey, FingerprintStrategy, LengthTailFingerprint};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use scheduler::{PageScheduler, SchedulerState};
pub use stream::{document_stream, extract_stream};
