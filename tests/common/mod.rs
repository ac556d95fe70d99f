//! In-memory PDF builder shared by the integration tests.
//!
//! Documents are generated with lopdf at test time so the suite needs no
//! fixture files and no network.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Object, ObjectId, Stream};

/// Route library logs to the test harness; `RUST_LOG` selects the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Pixel layout of a generated image XObject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// 8-bit DeviceRGB, Flate-compressed.
    Rgb,
    /// 8-bit DeviceRGB with an 8-bit DeviceGray soft mask.
    RgbWithAlpha,
    /// 8-bit DeviceGray (not a supported encoding).
    Gray,
    /// Baseline JPEG (DCTDecode).
    Jpeg,
    /// Baseline JPEG declared behind a `[/FlateDecode /DCTDecode]` chain.
    FlateJpeg,
}

/// Deterministic noise; different seeds give visibly different images.
pub fn noise(seed: u64, len: usize) -> Vec<u8> {
    let mut x = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1;
    (0..len)
        .map(|_| {
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            (x >> 24) as u8
        })
        .collect()
}

/// What to put on one page.
pub enum PageContent<'a> {
    /// Text runs, then the listed XObjects drawn in order.
    Normal {
        text: &'a [&'a str],
        xobjects: &'a [ObjectId],
    },
    /// Text plus a `Do` whose `/XObject` resource entry is not a dictionary.
    BrokenXObjects { text: &'a [&'a str] },
    /// A single UTF-16BE string shown with `TJ`.
    Utf16 { text: &'a str },
}

pub struct PdfBuilder {
    doc: lopdf::Document,
    pages_id: ObjectId,
    font_id: ObjectId,
    kids: Vec<Object>,
}

impl Default for PdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfBuilder {
    pub fn new() -> Self {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        Self {
            doc,
            pages_id,
            font_id,
            kids: Vec::new(),
        }
    }

    /// Add an image XObject and return its id; it can be drawn any number of times.
    pub fn image(&mut self, width: u32, height: u32, kind: ImageKind, seed: u64) -> ObjectId {
        let pixels = (width * height) as usize;
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "BitsPerComponent" => 8,
        };

        let stream = match kind {
            ImageKind::Rgb | ImageKind::RgbWithAlpha => {
                dict.set("ColorSpace", "DeviceRGB");
                if kind == ImageKind::RgbWithAlpha {
                    let mut mask = Stream::new(
                        dictionary! {
                            "Type" => "XObject",
                            "Subtype" => "Image",
                            "Width" => width as i64,
                            "Height" => height as i64,
                            "ColorSpace" => "DeviceGray",
                            "BitsPerComponent" => 8,
                        },
                        noise(seed ^ 0xA1FA, pixels),
                    );
                    let _ = mask.compress();
                    let mask_id = self.doc.add_object(mask);
                    dict.set("SMask", Object::Reference(mask_id));
                }
                let mut stream = Stream::new(dict, noise(seed, pixels * 3));
                let _ = stream.compress();
                stream
            }
            ImageKind::Gray => {
                dict.set("ColorSpace", "DeviceGray");
                Stream::new(dict, noise(seed, pixels))
            }
            ImageKind::Jpeg => {
                dict.set("ColorSpace", "DeviceRGB");
                dict.set("Filter", "DCTDecode");
                Stream::new(dict, jpeg(width, height, seed)).with_compression(false)
            }
            ImageKind::FlateJpeg => {
                dict.set("ColorSpace", "DeviceRGB");
                let mut stream = Stream::new(dict, jpeg(width, height, seed));
                let _ = stream.compress();
                stream.dict.set(
                    "Filter",
                    vec![
                        Object::Name(b"FlateDecode".to_vec()),
                        Object::Name(b"DCTDecode".to_vec()),
                    ],
                );
                stream
            }
        };
        self.doc.add_object(stream)
    }

    /// A Form XObject that draws the given XObjects.
    pub fn form(&mut self, xobjects: &[ObjectId]) -> ObjectId {
        let (ops, names) = draw_ops(xobjects);
        let content = Content { operations: ops };
        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Resources" => dictionary! { "XObject" => Object::Dictionary(names) },
            },
            content.encode().unwrap_or_default(),
        );
        self.doc.add_object(stream)
    }

    pub fn page(&mut self, content: PageContent<'_>) -> &mut Self {
        let mut operations = Vec::new();
        let mut resources = dictionary! {
            "Font" => dictionary! { "F1" => Object::Reference(self.font_id) },
        };

        let text: &[&str] = match &content {
            PageContent::Normal { text, .. } | PageContent::BrokenXObjects { text } => *text,
            PageContent::Utf16 { .. } => &[],
        };
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
        for (i, run) in text.iter().enumerate() {
            operations.push(Operation::new("Td", vec![72.into(), (700 - 14 * i as i64).into()]));
            operations.push(Operation::new("Tj", vec![Object::string_literal(*run)]));
        }
        if let PageContent::Utf16 { text } = &content {
            let mut bytes = vec![0xFE, 0xFF];
            for unit in text.encode_utf16() {
                bytes.extend_from_slice(&unit.to_be_bytes());
            }
            operations.push(Operation::new(
                "TJ",
                vec![Object::Array(vec![Object::String(
                    bytes,
                    lopdf::StringFormat::Hexadecimal,
                )])],
            ));
        }
        operations.push(Operation::new("ET", vec![]));

        match content {
            PageContent::Normal { xobjects, .. } if !xobjects.is_empty() => {
                let (ops, names) = draw_ops(xobjects);
                operations.extend(ops);
                resources.set("XObject", Object::Dictionary(names));
            }
            PageContent::BrokenXObjects { .. } => {
                operations.push(Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]));
                resources.set("XObject", Object::Integer(5));
            }
            _ => {}
        }

        let content = Content { operations };
        let content_id = self.doc.add_object(Stream::new(
            dictionary! {},
            content.encode().unwrap_or_default(),
        ));
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(self.pages_id),
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => Object::Reference(content_id),
            "Resources" => resources,
        });
        self.kids.push(Object::Reference(page_id));
        self
    }

    /// Shorthand for a text-only page.
    pub fn text_page(&mut self, text: &[&str]) -> &mut Self {
        self.page(PageContent::Normal { text, xobjects: &[] })
    }

    pub fn build(mut self) -> Vec<u8> {
        let count = self.kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => self.kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(self.pages_id),
        });
        self.doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buf = Vec::new();
        self.doc.save_to(&mut buf).expect("save generated PDF");
        buf
    }
}

/// `q … cm /ImN Do Q` per XObject, plus the matching resource names.
fn draw_ops(xobjects: &[ObjectId]) -> (Vec<Operation>, Dictionary) {
    let mut ops = Vec::new();
    let mut names = Dictionary::new();
    for (i, id) in xobjects.iter().enumerate() {
        let name = format!("Im{i}");
        names.set(name.as_bytes().to_vec(), Object::Reference(*id));
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new(
            "cm",
            vec![200.into(), 0.into(), 0.into(), 200.into(), 72.into(), 72.into()],
        ));
        ops.push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
        ops.push(Operation::new("Q", vec![]));
    }
    (ops, names)
}

/// A baseline JPEG of noise, encoded with the `image` crate.
fn jpeg(width: u32, height: u32, seed: u64) -> Vec<u8> {
    use image::ImageEncoder as _;
    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, 90)
        .write_image(
            &noise(seed, (width * height * 3) as usize),
            width,
            height,
            image::ExtendedColorType::Rgb8,
        )
        .expect("encode test JPEG");
    buf
}
