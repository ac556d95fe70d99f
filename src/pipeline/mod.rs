//! Pipeline stages for page text and image extraction.
//!
//! Each submodule implements exactly one transformation step, so each is
//! independently testable and the scheduler only wires them together.
//!
//! ## Data Flow
//!
//! ```text
//!            ┌─▶ text ─────────────────────────────────────────────┐
//! page ──────┤                                                     ├──▶ aggregate
//!            └─▶ resolve ──▶ normalize ──▶ encode ──▶ dedup ───────┘
//!               (operator    (RGB24 /      (JPEG +    (fingerprint
//!                list)        RGBA32)       base64)    set)
//! ```
//!
//! 1. [`input`]    : read a local path or download a URL into memory
//! 2. [`text`]     : join a page's text runs
//! 3. [`resolve`]  : lazily resolve large-enough image objects in operator order
//! 4. [`normalize`]: convert raw samples to canonical RGBA
//! 5. [`encode`]   : JPEG-encode and wrap as a base64 data URL
//! 6. [`dedup`]    : drop images whose fingerprint was already seen
//! 7. [`aggregate`]: assemble delimited text and the capped image list

pub mod aggregate;
pub mod dedup;
pub mod encode;
pub mod input;
pub mod normalize;
pub mod resolve;
pub mod text;
