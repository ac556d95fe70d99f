//! Result assembly: page-delimited text plus the accumulated image list.

use crate::output::{EncodedImage, ExtractionResult, PageExtraction};

/// Placeholder replaced by the page number in a page marker template.
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Default page marker template.
pub const DEFAULT_PAGE_MARKER: &str = "\n--- Page {page} ---\n";

/// Render the marker for a 1-indexed page.
pub fn render_marker(template: &str, page_num: usize) -> String {
    template.replace(PAGE_PLACEHOLDER, &page_num.to_string())
}

/// Collects page contributions in page order.
#[derive(Debug)]
pub struct ResultAggregator {
    marker: String,
    page_count: usize,
    text: String,
    images: Vec<EncodedImage>,
}

impl ResultAggregator {
    pub fn new(marker: impl Into<String>, page_count: usize) -> Self {
        Self {
            marker: marker.into(),
            page_count,
            text: String::new(),
            images: Vec::new(),
        }
    }

    /// Append one page: its marker, its text, then its accepted images.
    ///
    /// Pages must arrive in ascending order; the scheduler guarantees it.
    pub fn push_page(&mut self, page: PageExtraction) {
        self.text.push_str(&render_marker(&self.marker, page.page_num));
        self.text.push_str(&page.text);
        self.images.extend(page.images);
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn finish(self) -> ExtractionResult {
        ExtractionResult {
            text: self.text,
            page_count: self.page_count,
            images: self.images,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(page_num: usize, text: &str, images: usize) -> PageExtraction {
        PageExtraction {
            page_num,
            text: text.to_string(),
            images: (0..images)
                .map(|i| EncodedImage {
                    data: format!("data:image/jpeg;base64,{page_num}-{i}"),
                    width: 200,
                    height: 200,
                })
                .collect(),
        }
    }

    #[test]
    fn render_marker_substitutes_page() {
        assert_eq!(render_marker(DEFAULT_PAGE_MARKER, 12), "\n--- Page 12 ---\n");
        assert_eq!(render_marker("<!-- {page} -->", 3), "<!-- 3 -->");
    }

    #[test]
    fn concatenates_pages_with_markers() {
        let mut agg = ResultAggregator::new(DEFAULT_PAGE_MARKER, 3);
        agg.push_page(page(1, "alpha", 0));
        agg.push_page(page(2, "", 1));
        agg.push_page(page(3, "gamma", 2));
        let result = agg.finish();

        assert_eq!(
            result.text,
            "\n--- Page 1 ---\nalpha\n--- Page 2 ---\n\n--- Page 3 ---\ngamma"
        );
        assert_eq!(result.page_count, 3);
        let order: Vec<&str> = result.images.iter().map(|i| i.base64()).collect();
        assert_eq!(order, vec!["2-0", "3-0", "3-1"]);
    }

    #[test]
    fn empty_document() {
        let result = ResultAggregator::new(DEFAULT_PAGE_MARKER, 0).finish();
        assert_eq!(result.text, "");
        assert!(result.images.is_empty());
    }
}
