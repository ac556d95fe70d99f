//! Duplicate-image suppression.
//!
//! Documents often repeat the same picture (logos in headers, a figure
//! reproduced in an appendix). Each accepted image is reduced to a
//! [`FingerprintKey`]; an image whose key has already been seen in this run is
//! dropped and does not count against the image cap.
//!
//! The key is produced by a [`FingerprintStrategy`]. The default,
//! [`LengthTailFingerprint`], is a cheap approximation: the encoded length plus
//! the last 20 characters of the encoded string. It can merge two different
//! images that happen to share both (false positive), and it does not match
//! the same picture encoded under different settings (false negative).
//! [`ContentHashFingerprint`] hashes the whole encoded string when exact
//! equality is wanted.

use crate::output::EncodedImage;
use std::collections::HashSet;
use std::sync::Arc;

/// Characters from the end of the encoded string used by [`LengthTailFingerprint`].
pub const TAIL_LEN: usize = 20;

/// Identity proxy for an encoded image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FingerprintKey {
    /// Encoded byte length and trailing characters.
    LengthTail { len: usize, tail: String },
    /// blake3 digest of the full encoded string.
    Blake3([u8; 32]),
}

/// Reduces an encoded image to a key for equality checks.
pub trait FingerprintStrategy: Send + Sync {
    fn fingerprint(&self, image: &EncodedImage) -> FingerprintKey;

    /// Short name used in logs and CLI flags.
    fn name(&self) -> &'static str;
}

/// `(byte length, last 20 characters)` of the encoded string.
#[derive(Debug, Clone, Copy, Default)]
pub struct LengthTailFingerprint;

impl FingerprintStrategy for LengthTailFingerprint {
    fn fingerprint(&self, image: &EncodedImage) -> FingerprintKey {
        let data = &image.data;
        let start = data
            .char_indices()
            .rev()
            .nth(TAIL_LEN - 1)
            .map(|(i, _)| i)
            .unwrap_or(0);
        FingerprintKey::LengthTail {
            len: data.len(),
            tail: data[start..].to_string(),
        }
    }

    fn name(&self) -> &'static str {
        "length-tail"
    }
}

/// blake3 over the whole encoded string.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentHashFingerprint;

impl FingerprintStrategy for ContentHashFingerprint {
    fn fingerprint(&self, image: &EncodedImage) -> FingerprintKey {
        FingerprintKey::Blake3(*blake3::hash(image.data.as_bytes()).as_bytes())
    }

    fn name(&self) -> &'static str {
        "content-hash"
    }
}

/// Run-scoped set of fingerprints seen so far.
pub struct Deduplicator {
    strategy: Arc<dyn FingerprintStrategy>,
    seen: HashSet<FingerprintKey>,
}

impl Deduplicator {
    pub fn new(strategy: Arc<dyn FingerprintStrategy>) -> Self {
        Self {
            strategy,
            seen: HashSet::new(),
        }
    }

    /// Record the image's fingerprint.
    ///
    /// Returns `true` when the image is new and should be kept, `false` when
    /// its fingerprint was already seen.
    pub fn admit(&mut self, image: &EncodedImage) -> bool {
        self.seen.insert(self.strategy.fingerprint(image))
    }

    /// Number of distinct fingerprints recorded.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl std::fmt::Debug for Deduplicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deduplicator")
            .field("strategy", &self.strategy.name())
            .field("seen", &self.seen.len())
            .finish()
    }
}
