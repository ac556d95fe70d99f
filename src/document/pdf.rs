//! lopdf-backed [`Document`] implementation.
//!
//! The whole file is parsed up front by [`lopdf::Document::load_mem`]; after
//! that every page query is an in-memory walk over the object graph, so the
//! backend has no I/O of its own.
//!
//! What it understands is deliberately narrow:
//!
//! * text: the string operands of `Tj`, `'`, `"` and `TJ`, one run per show
//!   operation, decoded as UTF-16BE when BOM-prefixed and byte-per-char
//!   otherwise (no font encodings or CMaps);
//! * images: `Do` on Image XObjects, including those nested inside Form
//!   XObjects; 8-bit RGB samples (raw or Flate-compressed), optionally with an
//!   8-bit grey soft mask folded in as alpha, and baseline JPEG (`DCTDecode`
//!   as the only filter).
//!
//! Every other image encoding, filter chains ending in `DCTDecode` included,
//! is reported as [`ColorSpace::Unsupported`] so the pipeline can skip it.
//! An XObject reference that does not resolve to a stream is treated as a
//! non-image operator, so it never costs the page its other images.

use super::{ColorSpace, Document, DrawOp, RawImageObject};
use crate::error::{DocumentCorrupt, DocumentError};
use lopdf::content::Content;
use lopdf::{Dictionary, Object, ObjectId};
use std::collections::HashSet;
use tracing::{debug, info};

/// Maximum Form XObject nesting followed when building an operator list.
const MAX_FORM_DEPTH: usize = 8;

/// A PDF document parsed with lopdf.
pub struct PdfDocument {
    inner: lopdf::Document,
    /// Page object ids in page order (index 0 is page 1).
    page_ids: Vec<ObjectId>,
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("version", &self.inner.version)
            .field("page_count", &self.page_ids.len())
            .finish_non_exhaustive()
    }
}

impl PdfDocument {
    /// Parse PDF bytes.
    pub fn open(bytes: &[u8]) -> Result<Self, DocumentCorrupt> {
        let inner = lopdf::Document::load_mem(bytes).map_err(|e| DocumentCorrupt {
            detail: e.to_string(),
        })?;
        let page_ids: Vec<ObjectId> = inner.get_pages().into_values().collect();
        info!("PDF loaded: {} pages", page_ids.len());
        Ok(Self { inner, page_ids })
    }

    /// PDF header version, e.g. `"1.5"`.
    pub fn version(&self) -> &str {
        &self.inner.version
    }

    fn page_id(&self, page: usize) -> Result<ObjectId, DocumentError> {
        page.checked_sub(1)
            .and_then(|idx| self.page_ids.get(idx))
            .copied()
            .ok_or(DocumentError::PageOutOfRange {
                page,
                total: self.page_ids.len(),
            })
    }

    /// Follow an indirect reference, if `obj` is one.
    fn resolve<'a>(&'a self, obj: &'a Object) -> Result<&'a Object, DocumentError> {
        match obj {
            Object::Reference(id) => self
                .inner
                .get_object(*id)
                .map_err(|e| DocumentError::MissingObject(format!("{id:?}: {e}"))),
            other => Ok(other),
        }
    }

    fn page_dict(&self, page_id: ObjectId) -> Result<&Dictionary, DocumentError> {
        self.inner
            .get_object(page_id)
            .and_then(Object::as_dict)
            .map_err(|e| DocumentError::Parse(format!("failed to get page dictionary: {e}")))
    }

    /// Concatenated, decompressed bytes of the page's `/Contents`.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>, DocumentError> {
        let page_dict = self.page_dict(page_id)?;
        let contents = match page_dict.get(b"Contents") {
            Ok(obj) => self.resolve(obj)?,
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Stream(stream) => stream_bytes(stream),
            Object::Array(parts) => {
                let mut content = Vec::new();
                for part in parts {
                    let stream = self.resolve(part)?.as_stream().map_err(|e| {
                        DocumentError::Parse(format!("/Contents array item is not a stream: {e}"))
                    })?;
                    if !content.is_empty() {
                        content.push(b' ');
                    }
                    content.extend_from_slice(&stream_bytes(stream)?);
                }
                Ok(content)
            }
            _ => Err(DocumentError::Parse(
                "/Contents is not a stream or array".to_string(),
            )),
        }
    }

    /// The page's `/Resources`, walking up `/Parent` for inherited entries.
    fn page_resources(&self, page_id: ObjectId) -> Result<Option<&Dictionary>, DocumentError> {
        let mut current = page_id;
        let mut seen = HashSet::new();
        while seen.insert(current) {
            let dict = self.page_dict(current)?;
            if let Ok(resources) = dict.get(b"Resources") {
                let resources = self.resolve(resources)?.as_dict().map_err(|_| {
                    DocumentError::Parse("/Resources is not a dictionary".to_string())
                })?;
                return Ok(Some(resources));
            }
            match dict.get(b"Parent").and_then(Object::as_reference) {
                Ok(parent) => current = parent,
                Err(_) => break,
            }
        }
        Ok(None)
    }

    /// The `/XObject` sub-dictionary of a resource dictionary.
    fn xobjects<'a>(
        &'a self,
        resources: Option<&'a Dictionary>,
    ) -> Result<Option<&'a Dictionary>, DocumentError> {
        let Some(entry) = resources.and_then(|r| r.get(b"XObject").ok()) else {
            return Ok(None);
        };
        self.resolve(entry)?
            .as_dict()
            .map(Some)
            .map_err(|_| DocumentError::Parse("/XObject is not a dictionary".to_string()))
    }

    fn collect_ops(
        &self,
        content: &[u8],
        resources: Option<&Dictionary>,
        depth: usize,
        active: &mut HashSet<ObjectId>,
        out: &mut Vec<DrawOp<ObjectId>>,
    ) -> Result<(), DocumentError> {
        let content = Content::decode(content)
            .map_err(|e| DocumentError::Parse(format!("content stream: {e}")))?;

        for op in content.operations {
            if op.operator != "Do" {
                out.push(DrawOp::Other {
                    operator: op.operator,
                });
                continue;
            }

            let name = op
                .operands
                .first()
                .and_then(|o| o.as_name().ok())
                .ok_or_else(|| DocumentError::Parse("Do without a name operand".to_string()))?;

            let target = self
                .xobjects(resources)?
                .and_then(|xobjects| xobjects.get(name).ok())
                .and_then(|o| o.as_reference().ok());
            let Some(id) = target else {
                debug!(
                    "XObject /{} not found in resources",
                    String::from_utf8_lossy(name)
                );
                out.push(DrawOp::Other { operator: op.operator });
                continue;
            };

            let stream = match self.inner.get_object(id).and_then(Object::as_stream) {
                Ok(stream) => stream,
                Err(e) => {
                    debug!("XObject {:?} cannot be resolved: {}", id, e);
                    out.push(DrawOp::Other { operator: op.operator });
                    continue;
                }
            };

            match stream.dict.get(b"Subtype").and_then(Object::as_name) {
                Ok(b"Image") => out.push(DrawOp::PaintImage {
                    handle: id,
                    width: self.dimension(&stream.dict, b"Width"),
                    height: self.dimension(&stream.dict, b"Height"),
                }),
                Ok(b"Form") if depth < MAX_FORM_DEPTH && active.insert(id) => {
                    let form_resources = match stream.dict.get(b"Resources") {
                        Ok(obj) => self.resolve(obj)?.as_dict().ok(),
                        Err(_) => resources,
                    };
                    let expanded = stream_bytes(stream).and_then(|form_content| {
                        self.collect_ops(&form_content, form_resources, depth + 1, active, out)
                    });
                    active.remove(&id);
                    expanded?;
                }
                _ => out.push(DrawOp::Other { operator: op.operator }),
            }
        }
        Ok(())
    }

    fn dimension(&self, dict: &Dictionary, key: &[u8]) -> u32 {
        dict.get(key)
            .ok()
            .and_then(|o| self.resolve(o).ok())
            .and_then(|o| o.as_i64().ok())
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(0)
    }

    /// Colour space name and, for `ICCBased`, its component count.
    fn color_space(&self, dict: &Dictionary) -> (String, Option<i64>) {
        let Some(obj) = dict.get(b"ColorSpace").ok().and_then(|o| self.resolve(o).ok()) else {
            return ("none".to_string(), None);
        };
        match obj {
            Object::Name(name) => (String::from_utf8_lossy(name).into_owned(), None),
            Object::Array(items) => {
                let family = items
                    .first()
                    .and_then(|o| o.as_name().ok())
                    .map(|n| String::from_utf8_lossy(n).into_owned())
                    .unwrap_or_else(|| "unknown".to_string());
                let components = if family == "ICCBased" {
                    items
                        .get(1)
                        .and_then(|o| self.resolve(o).ok())
                        .and_then(|o| o.as_stream().ok())
                        .and_then(|s| s.dict.get(b"N").ok())
                        .and_then(|n| n.as_i64().ok())
                } else {
                    None
                };
                (family, components)
            }
            _ => ("unknown".to_string(), None),
        }
    }

    /// An 8-bit grey `/SMask` matching the image size, as one alpha byte per pixel.
    fn soft_mask(&self, dict: &Dictionary, width: u32, height: u32) -> Option<Vec<u8>> {
        let mask = dict
            .get(b"SMask")
            .ok()
            .and_then(|o| self.resolve(o).ok())
            .and_then(|o| o.as_stream().ok())?;
        let (space, _) = self.color_space(&mask.dict);
        if space != "DeviceGray"
            || self.dimension(&mask.dict, b"Width") != width
            || self.dimension(&mask.dict, b"Height") != height
            || self.dimension(&mask.dict, b"BitsPerComponent") != 8
        {
            debug!("Ignoring soft mask with unsupported layout ({space})");
            return None;
        }
        let alpha = stream_bytes(mask).ok()?;
        (alpha.len() >= width as usize * height as usize).then_some(alpha)
    }
}

impl Document for PdfDocument {
    type ImageHandle = ObjectId;

    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn text_runs(&self, page: usize) -> Result<Vec<String>, DocumentError> {
        let content = self.page_content(self.page_id(page)?)?;
        let content = Content::decode(&content)
            .map_err(|e| DocumentError::Parse(format!("content stream: {e}")))?;

        let mut runs = Vec::new();
        for op in &content.operations {
            let run = match op.operator.as_str() {
                "Tj" | "'" => op.operands.last().and_then(string_operand),
                "\"" => op.operands.get(2).and_then(string_operand),
                "TJ" => op.operands.first().and_then(|o| o.as_array().ok()).map(|items| {
                    items.iter().filter_map(string_operand).collect::<String>()
                }),
                _ => None,
            };
            if let Some(run) = run {
                runs.push(run);
            }
        }
        Ok(runs)
    }

    fn operator_list(&self, page: usize) -> Result<Vec<DrawOp<ObjectId>>, DocumentError> {
        let page_id = self.page_id(page)?;
        let content = self.page_content(page_id)?;
        let resources = self.page_resources(page_id)?;

        let mut ops = Vec::new();
        let mut active = HashSet::new();
        self.collect_ops(&content, resources, 0, &mut active, &mut ops)?;
        Ok(ops)
    }

    fn image_object(&self, page: usize, handle: &ObjectId) -> Result<RawImageObject, DocumentError> {
        let stream = self
            .inner
            .get_object(*handle)
            .and_then(Object::as_stream)
            .map_err(|e| DocumentError::MissingObject(format!("image {handle:?} on page {page}: {e}")))?;
        let dict = &stream.dict;
        let width = self.dimension(dict, b"Width");
        let height = self.dimension(dict, b"Height");

        let filters = filter_names(dict);
        if filters.iter().any(|f| f == "DCTDecode") {
            if filters.len() > 1 {
                return Ok(unsupported(width, height, filters.join("+")));
            }
            return decode_jpeg(&stream.content);
        }
        if let Some(other) = filters.iter().find(|f| f.as_str() != "FlateDecode") {
            return Ok(unsupported(width, height, other.clone()));
        }
        if matches!(dict.get(b"ImageMask").and_then(Object::as_bool), Ok(true)) {
            return Ok(unsupported(width, height, "ImageMask".to_string()));
        }

        let bits = match dict.get(b"BitsPerComponent") {
            Ok(_) => self.dimension(dict, b"BitsPerComponent"),
            Err(_) => 8,
        };
        let (space, components) = self.color_space(dict);
        let is_rgb = space == "DeviceRGB" || (space == "ICCBased" && components == Some(3));
        if !is_rgb || bits != 8 {
            return Ok(unsupported(width, height, format!("{space}/{bits}bpc")));
        }

        let samples = stream_bytes(stream)?;
        let raw = match self.soft_mask(dict, width, height) {
            Some(alpha) if samples.len() >= width as usize * height as usize * 3 => {
                RawImageObject {
                    width,
                    height,
                    color_space: ColorSpace::Rgba32,
                    samples: merge_alpha(&samples, &alpha, width as usize * height as usize),
                }
            }
            _ => RawImageObject {
                width,
                height,
                color_space: ColorSpace::Rgb24,
                samples,
            },
        };
        Ok(raw)
    }
}

/// Stream payload, decompressed when a filter is declared.
fn stream_bytes(stream: &lopdf::Stream) -> Result<Vec<u8>, DocumentError> {
    if stream.dict.get(b"Filter").is_ok() {
        stream
            .decompressed_content()
            .map_err(|e| DocumentError::Decode(format!("failed to decompress stream: {e}")))
    } else {
        Ok(stream.content.clone())
    }
}

/// `/Filter` as a list of names (it may be a single name or an array).
fn filter_names(dict: &Dictionary) -> Vec<String> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![String::from_utf8_lossy(name).into_owned()],
        Ok(Object::Array(items)) => items
            .iter()
            .filter_map(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).into_owned())
            .collect(),
        _ => Vec::new(),
    }
}

fn unsupported(width: u32, height: u32, tag: String) -> RawImageObject {
    RawImageObject {
        width,
        height,
        color_space: ColorSpace::Unsupported(tag),
        samples: Vec::new(),
    }
}

fn decode_jpeg(data: &[u8]) -> Result<RawImageObject, DocumentError> {
    let img = image::load_from_memory_with_format(data, image::ImageFormat::Jpeg)
        .map_err(|e| DocumentError::Decode(format!("JPEG: {e}")))?;
    let (width, height) = (img.width(), img.height());
    let raw = match img {
        image::DynamicImage::ImageRgb8(buf) => RawImageObject {
            width,
            height,
            color_space: ColorSpace::Rgb24,
            samples: buf.into_raw(),
        },
        image::DynamicImage::ImageRgba8(buf) => RawImageObject {
            width,
            height,
            color_space: ColorSpace::Rgba32,
            samples: buf.into_raw(),
        },
        other => unsupported(width, height, format!("DCTDecode/{:?}", other.color())),
    };
    Ok(raw)
}

/// Interleave `pixels` RGB triples with one alpha byte each.
fn merge_alpha(rgb: &[u8], alpha: &[u8], pixels: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixels * 4);
    for (px, a) in rgb.chunks_exact(3).zip(alpha).take(pixels) {
        out.extend_from_slice(px);
        out.push(*a);
    }
    out
}

fn string_operand(obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        _ => None,
    }
}

/// Decode a PDF string operand: UTF-16BE with BOM, otherwise one char per byte.
fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| char::from(b)).collect()
    }
}
