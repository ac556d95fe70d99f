//! Image object resolution: walk a page's operator list and fetch the raw
//! image objects behind image-paint operations.
//!
//! Resolution is lazy. The operator list is fetched once when the resolver is
//! created; each image object is only fetched when the iterator reaches it, so
//! the scheduler can stop pulling as soon as the image cap is hit and never
//! holds more than one raw sample buffer at a time.
//!
//! Images whose width or height does not exceed the minimum dimension (icons,
//! rules, bullets) are skipped before their samples are fetched and never
//! count against the cap.

use crate::document::{Document, DrawOp, RawImageObject};
use crate::error::PageError;
use tracing::debug;

/// Lazy sequence of one page's qualifying image objects, in operator order.
pub struct ImageObjectResolver<'a, D: Document> {
    document: &'a D,
    page: usize,
    ops: std::vec::IntoIter<DrawOp<D::ImageHandle>>,
    min_dimension: u32,
}

impl<'a, D: Document> ImageObjectResolver<'a, D> {
    /// Fetch the page's operator list.
    ///
    /// An unparseable operator list is a [`PageError::ImageScanFailure`]: the
    /// page contributes no images.
    pub fn scan(document: &'a D, page: usize, min_dimension: u32) -> Result<Self, PageError> {
        let ops = document
            .operator_list(page)
            .map_err(|e| PageError::ImageScanFailure {
                page,
                detail: e.to_string(),
            })?;
        debug!("Page {}: {} operators", page, ops.len());
        Ok(Self {
            document,
            page,
            ops: ops.into_iter(),
            min_dimension,
        })
    }

    fn large_enough(&self, width: u32, height: u32) -> bool {
        width > self.min_dimension && height > self.min_dimension
    }
}

impl<D: Document> Iterator for ImageObjectResolver<'_, D> {
    /// A failed fetch is yielded as an error so the caller can log it; the
    /// iterator itself keeps going.
    type Item = Result<RawImageObject, PageError>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(op) = self.ops.next() {
            let DrawOp::PaintImage {
                handle,
                width,
                height,
            } = op
            else {
                continue;
            };

            if !self.large_enough(width, height) {
                debug!(
                    "Page {}: skipping small image {}x{}",
                    self.page, width, height
                );
                continue;
            }

            match self.document.image_object(self.page, &handle) {
                Ok(raw) if !self.large_enough(raw.width, raw.height) => {
                    debug!(
                        "Page {}: skipping image resolved at {}x{}",
                        self.page, raw.width, raw.height
                    );
                }
                Ok(raw) => return Some(Ok(raw)),
                Err(e) => {
                    return Some(Err(PageError::ImageDecodeFailure {
                        page: self.page,
                        detail: e.to_string(),
                    }))
                }
            }
        }
        None
    }
}
