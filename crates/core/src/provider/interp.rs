//! Content-stream interpreter that turns text operators into word fragments.
//!
//! Handles: q, Q, cm, BT, ET, Tc, Tw, Tz, TL, Tf, Ts, Td, TD, Tm, T*, Tj, TJ, ', "
//!
//! Everything else (paths, images, colour, marked content, form XObjects) is
//! ignored. Glyph positions are tracked in text space and mapped to user
//! space through the text matrix and the CTM; consecutive glyphs are merged
//! into word fragments by [`WordGrouper`].

use std::sync::Arc;

use lopdf::Object;
use lopdf::content::Operation;
use rustc_hash::FxHashMap;
use tracing::{trace, warn};

use super::font::FontInfo;
use super::objects::number;
use crate::model::TextFragment;
use crate::utils::{
    MATRIX_IDENTITY, Matrix, Point, apply_matrix_norm, apply_matrix_pt, matrix_from_slice,
    mult_matrix,
};

/// Font resources of a page, keyed by resource name.
pub type FontMap<'d> = FxHashMap<Vec<u8>, Arc<FontInfo<'d>>>;

/// Baseline drift tolerated inside one word.
const BASELINE_TOLERANCE: f64 = 1.0;
/// Horizontal gap, in points, that ends a word.
const GAP_TOLERANCE: f64 = 1.0;
const SIZE_TOLERANCE: f64 = 0.01;

/// One element of a `TJ` array.
#[derive(Debug, Clone)]
pub enum TextItem<'a> {
    Bytes(&'a [u8]),
    /// Adjustment in thousandths of text space, subtracted from the position.
    Offset(f64),
}

#[derive(Debug, Clone)]
struct TextState<'d> {
    font: Option<Arc<FontInfo<'d>>>,
    fontsize: f64,
    charspace: f64,
    wordspace: f64,
    scaling: f64,
    /// Stored negated, so `T*` moves by `(0, leading)`.
    leading: f64,
    rise: f64,
    /// Text line matrix (Tlm).
    matrix: Matrix,
    /// Current position relative to `matrix`.
    linematrix: Point,
}

impl TextState<'_> {
    fn new() -> Self {
        Self {
            font: None,
            fontsize: 0.0,
            charspace: 0.0,
            wordspace: 0.0,
            scaling: 100.0,
            leading: 0.0,
            rise: 0.0,
            matrix: MATRIX_IDENTITY,
            linematrix: (0.0, 0.0),
        }
    }

    fn reset(&mut self) {
        self.matrix = MATRIX_IDENTITY;
        self.linematrix = (0.0, 0.0);
    }
}

/// A decoded glyph placed on the page, `top` measured from the page top.
#[derive(Debug, Clone)]
struct Glyph {
    text: String,
    x0: f64,
    x1: f64,
    baseline: f64,
    top: f64,
    size: f64,
}

/// Merges glyphs into word fragments.
///
/// A word ends at a whitespace glyph, a font-size change, a baseline shift or
/// a horizontal jump larger than [`GAP_TOLERANCE`].
#[derive(Debug, Default)]
pub struct WordGrouper {
    current: Option<Glyph>,
    fragments: Vec<TextFragment>,
}

impl WordGrouper {
    fn push(&mut self, glyph: Glyph) {
        if glyph.text.is_empty() {
            return;
        }
        if glyph.text.chars().all(char::is_whitespace) {
            self.flush();
            return;
        }
        if let Some(word) = &mut self.current {
            let continues = (word.size - glyph.size).abs() < SIZE_TOLERANCE
                && (word.baseline - glyph.baseline).abs() <= BASELINE_TOLERANCE
                && (glyph.x0 - word.x1).abs() <= GAP_TOLERANCE;
            if continues {
                word.text.push_str(&glyph.text);
                word.x1 = word.x1.max(glyph.x1);
                word.top = word.top.min(glyph.top);
                return;
            }
        }
        self.flush();
        self.current = Some(glyph);
    }

    fn flush(&mut self) {
        if let Some(word) = self.current.take() {
            self.fragments.push(TextFragment::new(
                word.text, word.top, word.x0, word.x1, word.size,
            ));
        }
    }

    pub fn finish(mut self) -> Vec<TextFragment> {
        self.flush();
        self.fragments
    }
}

/// Interprets one page's content stream.
pub struct PageInterpreter<'a, 'd> {
    fonts: &'a FontMap<'d>,
    fallback_font: Arc<FontInfo<'d>>,
    /// Top edge of the page box in user space.
    page_top: f64,
    ctm: Matrix,
    gstack: Vec<(Matrix, TextState<'d>)>,
    textstate: TextState<'d>,
    words: WordGrouper,
}

#[allow(non_snake_case)]
impl<'a, 'd> PageInterpreter<'a, 'd> {
    pub fn new(fonts: &'a FontMap<'d>, page_top: f64) -> Self {
        Self {
            fonts,
            fallback_font: Arc::new(FontInfo::fallback()),
            page_top,
            ctm: MATRIX_IDENTITY,
            gstack: Vec::new(),
            textstate: TextState::new(),
            words: WordGrouper::default(),
        }
    }

    /// Runs all operations and returns the collected word fragments.
    pub fn run(mut self, operations: &[Operation]) -> Vec<TextFragment> {
        for op in operations {
            self.execute(op);
        }
        self.words.finish()
    }

    fn execute(&mut self, op: &Operation) {
        let operands = &op.operands;
        let nums: Vec<f64> = operands.iter().filter_map(number).collect();

        match (op.operator.as_str(), nums.as_slice()) {
            ("q", _) => self.do_q(),
            ("Q", _) => self.do_Q(),
            ("cm", values) => match matrix_from_slice(values) {
                Some(m) => self.do_cm(m),
                None => trace!(?operands, "malformed cm"),
            },
            ("BT", _) => self.do_BT(),
            ("ET", _) => {}
            ("Tc", &[v]) => self.textstate.charspace = v,
            ("Tw", &[v]) => self.textstate.wordspace = v,
            ("Tz", &[v]) => self.textstate.scaling = v,
            ("TL", &[v]) => self.textstate.leading = -v,
            ("Ts", &[v]) => self.textstate.rise = v,
            ("Tf", &[size]) => {
                let name = operands.first().and_then(|obj| obj.as_name().ok());
                self.do_Tf(name, size);
            }
            ("Td", &[tx, ty]) => self.do_Td(tx, ty),
            ("TD", &[tx, ty]) => {
                self.do_Td(tx, ty);
                self.textstate.leading = ty;
            }
            ("Tm", values) => match matrix_from_slice(values) {
                Some(m) => self.do_Tm(m),
                None => trace!(?operands, "malformed Tm"),
            },
            ("T*", _) => self.do_T_star(),
            ("Tj", _) => {
                if let Some(bytes) = string_operand(operands.first()) {
                    self.show(&[TextItem::Bytes(bytes)]);
                }
            }
            ("TJ", _) => {
                if let Some(Object::Array(items)) = operands.first() {
                    let seq: Vec<TextItem<'_>> = items
                        .iter()
                        .filter_map(|item| match item {
                            Object::String(bytes, _) => Some(TextItem::Bytes(bytes.as_slice())),
                            other => number(other).map(TextItem::Offset),
                        })
                        .collect();
                    self.show(&seq);
                }
            }
            ("'", _) => {
                self.do_T_star();
                if let Some(bytes) = string_operand(operands.first()) {
                    self.show(&[TextItem::Bytes(bytes)]);
                }
            }
            ("\"", _) => {
                if let (Some(aw), Some(ac)) = (
                    operands.first().and_then(number),
                    operands.get(1).and_then(number),
                ) {
                    self.textstate.wordspace = aw;
                    self.textstate.charspace = ac;
                }
                self.do_T_star();
                if let Some(bytes) = string_operand(operands.get(2)) {
                    self.show(&[TextItem::Bytes(bytes)]);
                }
            }
            ("Do", _) => trace!(?operands, "XObject not interpreted"),
            _ => {}
        }
    }

    // ========================================================================
    // Graphics state
    // ========================================================================

    fn do_q(&mut self) {
        self.gstack.push((self.ctm, self.textstate.clone()));
    }

    fn do_Q(&mut self) {
        if let Some((ctm, textstate)) = self.gstack.pop() {
            self.ctm = ctm;
            self.textstate = textstate;
        }
    }

    fn do_cm(&mut self, m: Matrix) {
        self.ctm = mult_matrix(m, self.ctm);
    }

    // ========================================================================
    // Text state and positioning
    // ========================================================================

    fn do_BT(&mut self) {
        self.textstate.reset();
    }

    fn do_Tf(&mut self, name: Option<&[u8]>, size: f64) {
        let font = name.and_then(|name| self.fonts.get(name)).cloned();
        if font.is_none() {
            warn!(
                font = %name.map(String::from_utf8_lossy).unwrap_or_default(),
                "font resource not found, using fallback metrics"
            );
        }
        self.textstate.font = font;
        self.textstate.fontsize = size;
    }

    fn do_Td(&mut self, tx: f64, ty: f64) {
        let (a, b, c, d, e, f) = self.textstate.matrix;
        let e_new = tx.mul_add(a, ty * c) + e;
        let f_new = tx.mul_add(b, ty * d) + f;
        self.textstate.matrix = (a, b, c, d, e_new, f_new);
        self.textstate.linematrix = (0.0, 0.0);
    }

    fn do_Tm(&mut self, m: Matrix) {
        self.textstate.matrix = m;
        self.textstate.linematrix = (0.0, 0.0);
    }

    fn do_T_star(&mut self) {
        let leading = self.textstate.leading;
        self.do_Td(0.0, leading);
    }

    // ========================================================================
    // Text showing
    // ========================================================================

    fn show(&mut self, seq: &[TextItem<'_>]) {
        let font = self
            .textstate
            .font
            .clone()
            .unwrap_or_else(|| Arc::clone(&self.fallback_font));
        let ts = &self.textstate;
        let matrix = mult_matrix(ts.matrix, self.ctm);
        let hscale = ts.scaling * 0.01;
        let fontsize = ts.fontsize;
        let charspace = ts.charspace * hscale;
        let wordspace = ts.wordspace * hscale;
        let rise = ts.rise;
        let dxscale = 0.001 * fontsize * hscale;
        let (mut x, y) = ts.linematrix;

        let (sx, sy) = apply_matrix_norm(matrix, (0.0, fontsize));
        let size = sx.hypot(sy);
        let descent = font.descent_ratio() * size;

        let mut needcharspace = false;
        for item in seq {
            match *item {
                TextItem::Offset(n) => {
                    x -= n * dxscale;
                    needcharspace = true;
                }
                TextItem::Bytes(data) => {
                    for code in font.codes(data) {
                        if needcharspace {
                            x += charspace;
                        }
                        let advance = font.width(code) * 0.001 * fontsize * hscale;
                        let (ox, oy) = apply_matrix_pt(matrix, (x, y + rise));
                        let (ex, _) = apply_matrix_pt(matrix, (x + advance, y + rise));
                        self.words.push(Glyph {
                            text: font.decode(code),
                            x0: ox.min(ex),
                            x1: ox.max(ex),
                            baseline: oy,
                            top: self.page_top - (oy + descent + size),
                            size,
                        });
                        x += advance;
                        if font.is_word_space(code) {
                            x += wordspace;
                        }
                        needcharspace = true;
                    }
                }
            }
        }
        self.textstate.linematrix = (x, y);
    }
}

fn string_operand(obj: Option<&Object>) -> Option<&[u8]> {
    match obj {
        Some(Object::String(bytes, _)) => Some(bytes.as_slice()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::StringFormat;

    fn op(operator: &str, operands: Vec<Object>) -> Operation {
        Operation::new(operator, operands)
    }

    fn text(s: &str) -> Object {
        Object::String(s.as_bytes().to_vec(), StringFormat::Literal)
    }

    fn fonts() -> FontMap<'static> {
        let mut fonts = FontMap::default();
        fonts.insert(b"F1".to_vec(), Arc::new(FontInfo::fallback()));
        fonts
    }

    fn run(ops: Vec<Operation>) -> Vec<TextFragment> {
        let fonts = fonts();
        PageInterpreter::new(&fonts, 792.0).run(&ops)
    }

    #[test]
    fn words_split_at_spaces() {
        let frags = run(vec![
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), 10.into()]),
            op("Td", vec![72.into(), 600.into()]),
            op("Tj", vec![text("Hello big world")]),
            op("ET", vec![]),
        ]);
        let words: Vec<_> = frags.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(words, ["Hello", "big", "world"]);
        // fallback width 500: each glyph advances 5pt
        assert!((frags[0].x0 - 72.0).abs() < 1e-9);
        assert!((frags[0].x1 - 97.0).abs() < 1e-9);
        assert!((frags[1].x0 - 102.0).abs() < 1e-9);
        // no descent: top = 792 - (600 + 10)
        assert!((frags[0].top - 182.0).abs() < 1e-9);
        assert!((frags[0].size - 10.0).abs() < 1e-9);
    }

    #[test]
    fn tj_offsets_split_words_when_large() {
        let frags = run(vec![
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), 10.into()]),
            op("Td", vec![72.into(), 600.into()]),
            op(
                "TJ",
                vec![Object::Array(vec![
                    text("Ke"),
                    Object::Integer(20),
                    text("rn"),
                    Object::Integer(-500),
                    text("Gap"),
                ])],
            ),
        ]);
        let words: Vec<_> = frags.iter().map(|f| f.text.as_str()).collect();
        // -20/1000*10 = 0.2pt stays in the word, 5pt does not
        assert_eq!(words, ["Kern", "Gap"]);
    }

    #[test]
    fn separate_shows_on_same_baseline_join_when_adjacent() {
        let frags = run(vec![
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), 10.into()]),
            op("Tm", vec![1.into(), 0.into(), 0.into(), 1.into(), 100.into(), 500.into()]),
            op("Tj", vec![text("Intro")]),
            op("Tj", vec![text("duction")]),
            op("ET", vec![]),
        ]);
        assert_eq!(frags.len(), 1);
        assert_eq!(frags[0].text, "Introduction");
    }

    #[test]
    fn leading_and_next_line() {
        let frags = run(vec![
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), 12.into()]),
            op("TL", vec![14.into()]),
            op("Td", vec![72.into(), 700.into()]),
            op("Tj", vec![text("First")]),
            op("T*", vec![]),
            op("Tj", vec![text("Second")]),
            op("'", vec![text("Third")]),
        ]);
        let tops: Vec<_> = frags.iter().map(|f| f.top).collect();
        assert_eq!(frags.len(), 3);
        assert!((tops[1] - tops[0] - 14.0).abs() < 1e-9);
        assert!((tops[2] - tops[1] - 14.0).abs() < 1e-9);
        assert!(frags.iter().all(|f| (f.x0 - 72.0).abs() < 1e-9));
    }

    #[test]
    fn ctm_scales_font_size_and_restores() {
        let frags = run(vec![
            op("q", vec![]),
            op("cm", vec![2.into(), 0.into(), 0.into(), 2.into(), 0.into(), 0.into()]),
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), 9.into()]),
            op("Td", vec![36.into(), 300.into()]),
            op("Tj", vec![text("Scaled")]),
            op("ET", vec![]),
            op("Q", vec![]),
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), 9.into()]),
            op("Td", vec![72.into(), 100.into()]),
            op("Tj", vec![text("Plain")]),
            op("ET", vec![]),
        ]);
        assert!((frags[0].size - 18.0).abs() < 1e-9);
        assert!((frags[0].x0 - 72.0).abs() < 1e-9);
        assert!((frags[1].size - 9.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_font_uses_fallback() {
        let frags = run(vec![
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"Missing".to_vec()), 10.into()]),
            op("Td", vec![72.into(), 600.into()]),
            op("Tj", vec![text("Still")]),
        ]);
        assert_eq!(frags[0].text, "Still");
    }

    #[test]
    fn size_change_splits_word() {
        let frags = run(vec![
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), 10.into()]),
            op("Td", vec![72.into(), 600.into()]),
            op("Tj", vec![text("Big")]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), 14.into()]),
            op("Tj", vec![text("Bigger")]),
        ]);
        assert_eq!(frags.len(), 2);
    }
}
