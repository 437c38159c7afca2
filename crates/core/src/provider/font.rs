//! Font metrics and glyph decoding for the lopdf provider.
//!
//! Text decoding is delegated to lopdf (`/Encoding`, `/Differences` and
//! `/ToUnicode`); this module adds the glyph widths and descent that word
//! placement needs.

use std::fmt;
use std::slice::Chunks;

use lopdf::Encoding;
use lopdf::{Dictionary, Document, Object};
use rustc_hash::FxHashMap;
use tracing::warn;

use super::objects::{number, resolve};

/// Width used when a simple font has no usable metrics.
const SIMPLE_FALLBACK_WIDTH: f64 = 500.0;
/// Default `DW` of composite fonts.
const COMPOSITE_DEFAULT_WIDTH: f64 = 1000.0;
/// Largest `W` range expanded into the width table.
const MAX_WIDTH_RANGE: u32 = 0xFFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontKind {
    /// Type1, TrueType, Type3: one byte per code.
    Simple,
    /// Type0 with a CID descendant: two bytes per code.
    Composite,
}

impl FontKind {
    fn code_width(self) -> usize {
        match self {
            FontKind::Simple => 1,
            FontKind::Composite => 2,
        }
    }
}

/// What the interpreter needs to know about a font resource.
pub struct FontInfo<'a> {
    pub base_font: String,
    pub kind: FontKind,
    encoding: Option<Encoding<'a>>,
    first_char: u32,
    widths: Vec<f64>,
    missing_width: f64,
    cid_widths: FxHashMap<u32, f64>,
    /// Descent in glyph space (thousandths of text space), usually negative.
    descent: f64,
}

impl fmt::Debug for FontInfo<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontInfo")
            .field("base_font", &self.base_font)
            .field("kind", &self.kind)
            .field("has_encoding", &self.encoding.is_some())
            .finish_non_exhaustive()
    }
}

impl<'a> FontInfo<'a> {
    /// Font used when a resource is missing or unreadable.
    pub fn fallback() -> Self {
        Self {
            base_font: String::new(),
            kind: FontKind::Simple,
            encoding: None,
            first_char: 0,
            widths: Vec::new(),
            missing_width: SIMPLE_FALLBACK_WIDTH,
            cid_widths: FxHashMap::default(),
            descent: 0.0,
        }
    }

    /// Reads a font dictionary. Unreadable parts fall back to defaults.
    pub fn from_dict(doc: &'a Document, font: &'a Dictionary) -> Self {
        let base_font = font
            .get(b"BaseFont")
            .ok()
            .and_then(|obj| resolve(doc, obj).as_name().ok())
            .map(|name| String::from_utf8_lossy(name).into_owned())
            .unwrap_or_default();

        let is_type0 = font
            .get(b"Subtype")
            .ok()
            .and_then(|obj| obj.as_name().ok())
            == Some(b"Type0".as_slice());
        let kind = if is_type0 {
            FontKind::Composite
        } else {
            FontKind::Simple
        };

        // CID fonts without ToUnicode decode as identity code points
        let encoding = if kind == FontKind::Composite && !font.has(b"ToUnicode") {
            None
        } else {
            match font.get_font_encoding(doc) {
                Ok(encoding) => Some(encoding),
                Err(err) => {
                    warn!(font = %base_font, %err, "unreadable font encoding");
                    None
                }
            }
        };

        let mut info = Self {
            base_font,
            kind,
            encoding,
            ..Self::fallback()
        };

        if is_type0 {
            info.missing_width = COMPOSITE_DEFAULT_WIDTH;
            let descendant = font
                .get(b"DescendantFonts")
                .ok()
                .and_then(|obj| resolve(doc, obj).as_array().ok())
                .and_then(|fonts| fonts.first())
                .and_then(|obj| resolve(doc, obj).as_dict().ok());
            match descendant {
                Some(cid_font) => info.read_cid_metrics(doc, cid_font),
                None => warn!(font = %info.base_font, "Type0 font without descendant"),
            }
        } else {
            info.read_simple_metrics(doc, font);
        }
        info
    }

    fn read_simple_metrics(&mut self, doc: &Document, font: &Dictionary) {
        self.first_char = font
            .get(b"FirstChar")
            .ok()
            .and_then(|obj| number(resolve(doc, obj)))
            .map_or(0, |v| v.max(0.0) as u32);
        self.widths = font
            .get(b"Widths")
            .ok()
            .and_then(|obj| resolve(doc, obj).as_array().ok())
            .map(|widths| {
                widths
                    .iter()
                    .map(|w| number(resolve(doc, w)).unwrap_or(0.0))
                    .collect()
            })
            .unwrap_or_default();

        if let Some(descriptor) = descriptor(doc, font) {
            if let Some(width) = descriptor
                .get(b"MissingWidth")
                .ok()
                .and_then(|obj| number(resolve(doc, obj)))
                .filter(|w| *w > 0.0)
            {
                self.missing_width = width;
            }
            self.descent = descent(doc, descriptor);
        }
    }

    fn read_cid_metrics(&mut self, doc: &Document, cid_font: &Dictionary) {
        if let Some(dw) = cid_font
            .get(b"DW")
            .ok()
            .and_then(|obj| number(resolve(doc, obj)))
        {
            self.missing_width = dw;
        }
        if let Some(items) = cid_font
            .get(b"W")
            .ok()
            .and_then(|obj| resolve(doc, obj).as_array().ok())
        {
            self.cid_widths = parse_cid_widths(doc, items);
        }
        if let Some(descriptor) = descriptor(doc, cid_font) {
            self.descent = descent(doc, descriptor);
        }
    }

    /// Splits a shown string into the byte sequences of its character codes.
    pub fn codes<'b>(&self, bytes: &'b [u8]) -> Chunks<'b, u8> {
        bytes.chunks(self.kind.code_width())
    }

    /// Text for one code; empty if the code cannot be decoded.
    pub fn decode(&self, code: &[u8]) -> String {
        let decoded = self
            .encoding
            .as_ref()
            .and_then(|encoding| Document::decode_text(encoding, code).ok())
            .filter(|text| {
                !text.is_empty()
                    && !text
                        .chars()
                        .any(|c| c.is_control() || c == char::REPLACEMENT_CHARACTER)
            });
        if let Some(text) = decoded {
            return text;
        }
        char::from_u32(code_value(code))
            .filter(|c| !c.is_control())
            .map(String::from)
            .unwrap_or_default()
    }

    /// Advance width of a code in glyph space.
    pub fn width(&self, code: &[u8]) -> f64 {
        let code = code_value(code);
        match self.kind {
            FontKind::Simple => code
                .checked_sub(self.first_char)
                .and_then(|i| self.widths.get(i as usize))
                .copied()
                .filter(|w| *w > 0.0)
                .unwrap_or(self.missing_width),
            FontKind::Composite => self
                .cid_widths
                .get(&code)
                .copied()
                .unwrap_or(self.missing_width),
        }
    }

    /// Descent as a fraction of the font size.
    pub fn descent_ratio(&self) -> f64 {
        self.descent / 1000.0
    }

    /// True for single-byte code 32, the only code word spacing applies to.
    pub fn is_word_space(&self, code: &[u8]) -> bool {
        self.kind == FontKind::Simple && code == b" "
    }
}

/// Big-endian value of a character code.
fn code_value(code: &[u8]) -> u32 {
    code.iter().fold(0, |acc, &b| (acc << 8) | u32::from(b))
}

fn descriptor<'a>(doc: &'a Document, font: &'a Dictionary) -> Option<&'a Dictionary> {
    font.get(b"FontDescriptor")
        .ok()
        .and_then(|obj| resolve(doc, obj).as_dict().ok())
}

fn descent(doc: &Document, descriptor: &Dictionary) -> f64 {
    descriptor
        .get(b"Descent")
        .ok()
        .and_then(|obj| number(resolve(doc, obj)))
        .unwrap_or(0.0)
}

/// Parses a CIDFont `W` array: `c [w1 w2 ...]` and `c_first c_last w` entries.
///
/// Codes past `u32::MAX` are dropped.
fn parse_cid_widths(doc: &Document, items: &[Object]) -> FxHashMap<u32, f64> {
    let mut widths = FxHashMap::default();
    let mut i = 0;

    while let Some(first) = items.get(i).and_then(|obj| number(resolve(doc, obj))) {
        let first = first.max(0.0) as u32;
        match items.get(i + 1).map(|obj| resolve(doc, obj)) {
            Some(Object::Array(list)) => {
                for (offset, w) in list.iter().enumerate() {
                    let code = u32::try_from(offset)
                        .ok()
                        .and_then(|offset| first.checked_add(offset));
                    if let (Some(code), Some(w)) = (code, number(resolve(doc, w))) {
                        widths.insert(code, w);
                    }
                }
                i += 2;
            }
            Some(last) => {
                let (Some(last), Some(w)) = (
                    number(last),
                    items.get(i + 2).and_then(|obj| number(resolve(doc, obj))),
                ) else {
                    break;
                };
                let last = last.max(0.0) as u32;
                if last >= first && last - first <= MAX_WIDTH_RANGE {
                    for code in first..=last {
                        widths.insert(code, w);
                    }
                }
                i += 3;
            }
            None => break,
        }
    }
    widths
}
