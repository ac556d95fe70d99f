//! Page scheduler: one ordered pass over the document.
//!
//! ## Why an explicit state machine?
//!
//! Extraction of a long document takes a while, and it runs inside an async
//! runtime that other tasks share. The scheduler processes pages strictly in
//! ascending order on the caller's task and hands control back to the runtime
//! every `yield_interval` pages. Making the state explicit keeps the three
//! things that can happen between pages (keep going, yield, stop collecting
//! images) visible and testable instead of buried in loop flags.
//!
//! ```text
//!   Ready(p) ──page p──▶ Ready(p+1)
//!      │                    ▲
//!      │ p % K == 0         │ yield_now()
//!      ▼                    │
//!   Yielding(p+1) ──────────┘     (or Capped(p+1) once the cap is hit)
//!
//!   Capped(p) ──page p, text only──▶ Capped(p+1) ── p > N ──▶ Done
//! ```
//!
//! All run state (fingerprint set, image counter) is owned by one
//! `PageScheduler` value, so concurrent runs never share anything.

use crate::config::ExtractionConfig;
use crate::document::Document;
use crate::error::PageError;
use crate::output::{EncodedImage, PageExtraction};
use crate::pipeline::dedup::Deduplicator;
use crate::pipeline::encode::ImageEncoder;
use crate::pipeline::normalize::normalize;
use crate::pipeline::resolve::ImageObjectResolver;
use crate::pipeline::text::extract_page_text;
use tracing::{debug, info, warn};

/// Where the scheduler is in its pass over the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Page `p` is next; images are still being collected.
    Ready(usize),
    /// The previous page ended a yield interval; yield before page `p`.
    Yielding(usize),
    /// The image cap is reached; page `p` is next and gets text only.
    Capped(usize),
    /// Every page has been processed.
    Done,
}

/// Drives the per-page pipeline over a document, one page per call.
pub struct PageScheduler<D: Document> {
    document: D,
    config: ExtractionConfig,
    total_pages: usize,
    state: SchedulerState,
    dedup: Deduplicator,
    encoder: ImageEncoder,
    images_collected: usize,
}

impl<D: Document> PageScheduler<D> {
    /// Start a pass at page 1.
    ///
    /// A cap of zero starts directly in [`SchedulerState::Capped`].
    pub fn new(document: D, config: ExtractionConfig) -> Self {
        let total_pages = document.page_count();
        let state = if config.max_images == 0 {
            SchedulerState::Capped(1)
        } else {
            SchedulerState::Ready(1)
        };

        info!(
            "Extracting {} pages (max_images={}, min_dimension={}, fingerprint={})",
            total_pages,
            config.max_images,
            config.min_image_dimension,
            config.fingerprint.name()
        );
        if let Some(cb) = &config.progress_callback {
            cb.on_extraction_start(total_pages);
        }

        Self {
            dedup: Deduplicator::new(config.fingerprint.clone()),
            encoder: ImageEncoder::new(config.jpeg_quality),
            document,
            config,
            total_pages,
            state,
            images_collected: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn images_collected(&self) -> usize {
        self.images_collected
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Process the next page.
    ///
    /// Returns `None` once every page has been processed. Per-page failures
    /// never surface here: they are logged, reported to the progress
    /// callback, and the page contributes less.
    pub async fn next_page(&mut self) -> Option<PageExtraction> {
        loop {
            match self.state {
                SchedulerState::Done => return None,
                SchedulerState::Yielding(next) => {
                    debug!("Yielding before page {}", next);
                    tokio::task::yield_now().await;
                    self.state = self.continue_at(next);
                }
                SchedulerState::Ready(page) | SchedulerState::Capped(page)
                    if page > self.total_pages =>
                {
                    self.finish();
                    return None;
                }
                SchedulerState::Ready(page) => {
                    let extraction = self.process_page(page, true);
                    self.advance(page);
                    return Some(extraction);
                }
                SchedulerState::Capped(page) => {
                    let extraction = self.process_page(page, false);
                    self.advance(page);
                    return Some(extraction);
                }
            }
        }
    }

    // ── State transitions ────────────────────────────────────────────────

    fn continue_at(&self, page: usize) -> SchedulerState {
        if self.images_collected >= self.config.max_images {
            SchedulerState::Capped(page)
        } else {
            SchedulerState::Ready(page)
        }
    }

    fn advance(&mut self, page: usize) {
        self.state = if page % self.config.yield_interval.max(1) == 0 {
            SchedulerState::Yielding(page + 1)
        } else {
            self.continue_at(page + 1)
        };
    }

    fn finish(&mut self) {
        self.state = SchedulerState::Done;
        info!(
            "Extraction complete: {} pages, {} images ({} distinct fingerprints)",
            self.total_pages,
            self.images_collected,
            self.dedup.len()
        );
        if let Some(cb) = &self.config.progress_callback {
            cb.on_extraction_complete(self.total_pages, self.images_collected);
        }
    }

    // ── Page processing ──────────────────────────────────────────────────

    fn process_page(&mut self, page: usize, collect_images: bool) -> PageExtraction {
        if let Some(cb) = &self.config.progress_callback {
            cb.on_page_start(page, self.total_pages);
        }

        let text = match extract_page_text(&self.document, page) {
            Ok(text) => text,
            Err(e) => {
                self.report(&e);
                String::new()
            }
        };

        let images = if collect_images {
            self.collect_images(page)
        } else {
            Vec::new()
        };

        debug!(
            "Page {}/{}: {} chars, {} images",
            page,
            self.total_pages,
            text.len(),
            images.len()
        );
        if let Some(cb) = &self.config.progress_callback {
            cb.on_page_complete(page, self.total_pages, text.len(), images.len());
        }

        PageExtraction {
            page_num: page,
            text,
            images,
        }
    }

    /// Run resolve → normalize → encode → dedup for one page until the page
    /// runs out of images or the cap is reached.
    fn collect_images(&mut self, page: usize) -> Vec<EncodedImage> {
        let mut accepted = Vec::new();

        let resolver = match ImageObjectResolver::scan(
            &self.document,
            page,
            self.config.min_image_dimension,
        ) {
            Ok(resolver) => resolver,
            Err(e) => {
                self.report(&e);
                return accepted;
            }
        };

        for raw in resolver {
            let raw = match raw {
                Ok(raw) => raw,
                Err(e) => {
                    report(&self.config, self.total_pages, &e);
                    continue;
                }
            };

            let canonical = match normalize(&raw, page) {
                Ok(img) => img,
                Err(e) => {
                    report(&self.config, self.total_pages, &e);
                    continue;
                }
            };
            drop(raw);

            let encoded = match self.encoder.encode(&canonical) {
                Ok(encoded) => encoded,
                Err(e) => {
                    let e = PageError::EncodeFailure {
                        page,
                        detail: e.to_string(),
                    };
                    report(&self.config, self.total_pages, &e);
                    continue;
                }
            };
            drop(canonical);

            if !self.dedup.admit(&encoded) {
                debug!(
                    "Page {}: duplicate {}x{} image dropped",
                    page, encoded.width, encoded.height
                );
                continue;
            }

            accepted.push(encoded);
            self.images_collected += 1;
            if self.images_collected >= self.config.max_images {
                info!(
                    "Image cap of {} reached on page {}; remaining pages are text only",
                    self.config.max_images, page
                );
                break;
            }
        }

        accepted
    }

    fn report(&self, error: &PageError) {
        report(&self.config, self.total_pages, error);
    }
}

fn report(config: &ExtractionConfig, total_pages: usize, error: &PageError) {
    warn!("{}", error);
    if let Some(cb) = &config.progress_callback {
        cb.on_page_error(error.page(), total_pages, &error.to_string());
    }
}

impl<D: Document> std::fmt::Debug for PageScheduler<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageScheduler")
            .field("total_pages", &self.total_pages)
            .field("state", &self.state)
            .field("images_collected", &self.images_collected)
            .field("dedup", &self.dedup)
            .finish()
    }
}
