//! Configuration types for text and image extraction.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`], built
//! via its [`ExtractionConfigBuilder`]. Every knob lives in one struct so a
//! config can be shared across runs and printed when diagnosing why two runs
//! produced different results.
//!
//! # Design choice: builder over constructor
//! The builder lets callers set only what they care about and rely on the
//! documented defaults for the rest.

use crate::error::ExtractError;
use crate::pipeline::aggregate::{DEFAULT_PAGE_MARKER, PAGE_PLACEHOLDER};
use crate::pipeline::dedup::{FingerprintStrategy, LengthTailFingerprint};
use crate::pipeline::encode::DEFAULT_QUALITY;
use crate::progress::ProgressCallback;
use std::fmt;
use std::sync::Arc;

/// Configuration for one extraction run.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_pdf_extract::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .max_images(20)
///     .min_image_dimension(150)
///     .page_marker("\n<!-- page {page} -->\n")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Upper bound on images in the result. Default: 50.
    ///
    /// Scanned books can carry one full-page picture per page; without a cap
    /// a thousand-page scan would produce a result of several hundred MB.
    /// `0` disables image extraction entirely.
    pub max_images: usize,

    /// Images must be strictly larger than this on both sides. Default: 100.
    ///
    /// Filters icons, bullets and rule lines. Checked against the dimensions
    /// in the operator list, before any sample data is fetched.
    pub min_image_dimension: u32,

    /// Yield to the runtime after every N-th page. Default: 5.
    pub yield_interval: usize,

    /// JPEG quality, 1–100. Default: 80.
    pub jpeg_quality: u8,

    /// Page delimiter template; `{page}` is replaced by the 1-indexed page
    /// number. Default: `"\n--- Page {page} ---\n"`.
    pub page_marker: String,

    /// Duplicate-detection strategy. Default: [`LengthTailFingerprint`].
    pub fingerprint: Arc<dyn FingerprintStrategy>,

    /// Optional per-page event observer.
    pub progress_callback: Option<ProgressCallback>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_images: 50,
            min_image_dimension: 100,
            yield_interval: 5,
            jpeg_quality: DEFAULT_QUALITY,
            page_marker: DEFAULT_PAGE_MARKER.to_string(),
            fingerprint: Arc::new(LengthTailFingerprint),
            progress_callback: None,
            download_timeout_secs: 120,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("max_images", &self.max_images)
            .field("min_image_dimension", &self.min_image_dimension)
            .field("yield_interval", &self.yield_interval)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("page_marker", &self.page_marker)
            .field("fingerprint", &self.fingerprint.name())
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .field("download_timeout_secs", &self.download_timeout_secs)
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Check the constraints the builder enforces.
    ///
    /// Public fields can be edited after `build()`; the extraction entry
    /// points call this before doing any work.
    pub fn validate(&self) -> Result<(), ExtractError> {
        if self.yield_interval == 0 {
            return Err(ExtractError::InvalidConfig(
                "yield_interval must be ≥ 1".into(),
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ExtractError::InvalidConfig(format!(
                "jpeg_quality must be 1–100, got {}",
                self.jpeg_quality
            )));
        }
        if !self.page_marker.contains(PAGE_PLACEHOLDER) {
            return Err(ExtractError::InvalidConfig(format!(
                "page_marker must contain {PAGE_PLACEHOLDER}, got {:?}",
                self.page_marker
            )));
        }
        if self.download_timeout_secs == 0 {
            return Err(ExtractError::InvalidConfig(
                "download_timeout_secs must be ≥ 1".into(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`ExtractionConfig`].
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl fmt::Debug for ExtractionConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ExtractionConfigBuilder")
            .field(&self.config)
            .finish()
    }
}

impl ExtractionConfigBuilder {
    pub fn max_images(mut self, n: usize) -> Self {
        self.config.max_images = n;
        self
    }

    pub fn min_image_dimension(mut self, px: u32) -> Self {
        self.config.min_image_dimension = px;
        self
    }

    pub fn yield_interval(mut self, pages: usize) -> Self {
        self.config.yield_interval = pages.max(1);
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn page_marker(mut self, template: impl Into<String>) -> Self {
        self.config.page_marker = template.into();
        self
    }

    pub fn fingerprint(mut self, strategy: Arc<dyn FingerprintStrategy>) -> Self {
        self.config.fingerprint = strategy;
        self
    }

    pub fn progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.config.progress_callback = Some(callback);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ExtractError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
