//! PDF extractor: reconstructs reading order from positioned text items.
//!
//! Items come from a minimal content-stream interpreter over `lopdf` that
//! tracks the text and graphics matrices. Glyph widths are approximated
//! (half an em per character); the reconstruction only needs relative
//! positions. Documents whose text cannot be decoded this way (CID fonts,
//! custom encodings) fall back to `pdf-extract`'s flat text.

use std::collections::BTreeSet;

use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};
use tracing::{debug, warn};

use crate::extraction::config::PdfLayoutConfig;
use crate::extraction::error::{ExtractionError, Stage};
use crate::extraction::formats::text::printable_ratio;

/// Minimum alphanumeric characters for the positional pass to count as a text layer.
const MIN_LAYER_CHARS: usize = 20;
/// Average glyph advance as a fraction of the font size.
const AVG_GLYPH_EM: f64 = 0.5;
/// `TJ` kerning (thousandths of an em) beyond which a word break is assumed.
const TJ_SPACE_THRESHOLD: f64 = -200.0;

/// A run of text placed on the page, in user-space units (y grows upward).
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PdfText {
    pub text: String,
    pub page_count: usize,
    pub has_text_layer: bool,
    pub fonts: Vec<String>,
}

pub fn extract_pdf(bytes: &[u8], layout: &PdfLayoutConfig) -> Result<PdfText, ExtractionError> {
    let doc = Document::load_mem(bytes).map_err(|e| ExtractionError::failure(Stage::Pdf, e))?;
    let pages = doc.get_pages();
    let fonts = font_names(&doc);

    let mut page_texts = Vec::with_capacity(pages.len());
    for (page_num, page_id) in &pages {
        match page_items(&doc, *page_id) {
            Ok(items) => page_texts.push(reconstruct_page(&items, layout)),
            Err(e) => warn!(page = page_num, error = %e, "skipping unreadable PDF page"),
        }
    }

    let mut text = page_texts.join("\n\n");
    if !is_readable(&text) {
        debug!("positional pass found no usable text layer, trying flat extraction");
        if let Some(flat) = flat_text(bytes) {
            if is_readable(&flat) {
                text = flat;
            }
        }
    }

    Ok(PdfText {
        has_text_layer: is_readable(&text),
        text,
        page_count: pages.len(),
        fonts,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Reading-order reconstruction
// ────────────────────────────────────────────────────────────────────────────

/// Orders items top-to-bottom, then left-to-right, and joins them into lines.
///
/// Items whose y differs from the line's first item by at most
/// `line_merge_tolerance` share a line. Within a line a space is inserted when
/// the gap to the previous item exceeds `word_gap_ratio × height`.
pub fn reconstruct_page(items: &[TextItem], layout: &PdfLayoutConfig) -> String {
    let mut sorted: Vec<&TextItem> = items.iter().filter(|i| !i.text.is_empty()).collect();
    sorted.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut lines: Vec<(f64, Vec<&TextItem>)> = Vec::new();
    for item in sorted {
        match lines.last_mut() {
            Some((line_y, line)) if (*line_y - item.y).abs() <= layout.line_merge_tolerance => {
                line.push(item)
            }
            _ => lines.push((item.y, vec![item])),
        }
    }

    lines
        .into_iter()
        .map(|(_, mut line)| {
            line.sort_by(|a, b| a.x.total_cmp(&b.x));
            join_line(&line, layout.word_gap_ratio)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn join_line(line: &[&TextItem], word_gap_ratio: f64) -> String {
    let mut out = String::new();
    let mut prev: Option<&TextItem> = None;
    for item in line {
        if let Some(p) = prev {
            let gap = item.x - (p.x + p.width);
            if gap > item.height * word_gap_ratio
                && !out.ends_with(char::is_whitespace)
                && !item.text.starts_with(char::is_whitespace)
            {
                out.push(' ');
            }
        }
        out.push_str(&item.text);
        prev = Some(item);
    }
    out.trim_end().to_string()
}

// ────────────────────────────────────────────────────────────────────────────
// Content-stream interpreter
// ────────────────────────────────────────────────────────────────────────────

type Matrix = [f64; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

fn multiply(m1: &Matrix, m2: &Matrix) -> Matrix {
    [
        m1[0] * m2[0] + m1[1] * m2[2],
        m1[0] * m2[1] + m1[1] * m2[3],
        m1[2] * m2[0] + m1[3] * m2[2],
        m1[2] * m2[1] + m1[3] * m2[3],
        m1[4] * m2[0] + m1[5] * m2[2] + m2[4],
        m1[4] * m2[1] + m1[5] * m2[3] + m2[5],
    ]
}

fn translate(tx: f64, ty: f64) -> Matrix {
    [1.0, 0.0, 0.0, 1.0, tx, ty]
}

struct TextState {
    ctm: Matrix,
    saved: Vec<Matrix>,
    tm: Matrix,
    tlm: Matrix,
    font_size: f64,
    leading: f64,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            ctm: IDENTITY,
            saved: Vec::new(),
            tm: IDENTITY,
            tlm: IDENTITY,
            font_size: 12.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    fn move_line(&mut self, tx: f64, ty: f64) {
        self.tlm = multiply(&translate(tx, ty), &self.tlm);
        self.tm = self.tlm;
    }

    fn next_line(&mut self) {
        let leading = self.leading;
        self.move_line(0.0, -leading);
    }

    /// Records `text` at the current position and advances by `advance` text-space units.
    fn show(&mut self, text: String, advance: f64, items: &mut Vec<TextItem>) {
        let trm = multiply(&self.tm, &self.ctm);
        let scale_x = trm[0].hypot(trm[1]);
        let scale_y = trm[2].hypot(trm[3]);
        if !text.trim().is_empty() {
            items.push(TextItem {
                text,
                x: trm[4],
                y: trm[5],
                width: advance * scale_x,
                height: self.font_size * scale_y,
            });
        }
        self.tm = multiply(&translate(advance, 0.0), &self.tm);
    }

    fn glyph_advance(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.font_size * AVG_GLYPH_EM
    }
}

fn page_items(doc: &Document, page_id: ObjectId) -> Result<Vec<TextItem>, lopdf::Error> {
    let content = Content::decode(&doc.get_page_content(page_id)?)?;
    let mut state = TextState::default();
    let mut items = Vec::new();

    for op in &content.operations {
        let operands = &op.operands;
        match op.operator.as_str() {
            "q" => state.saved.push(state.ctm),
            "Q" => {
                if let Some(ctm) = state.saved.pop() {
                    state.ctm = ctm;
                }
            }
            "cm" => {
                if let Some(m) = matrix(operands) {
                    state.ctm = multiply(&m, &state.ctm);
                }
            }
            "BT" => {
                state.tm = IDENTITY;
                state.tlm = IDENTITY;
            }
            "Tf" => {
                if let Some(size) = operands.get(1).and_then(number) {
                    state.font_size = size.abs();
                }
            }
            "TL" => {
                if let Some(leading) = operands.first().and_then(number) {
                    state.leading = leading;
                }
            }
            "Td" | "TD" => {
                if let &[tx, ty] = numbers(operands).as_slice() {
                    if op.operator == "TD" {
                        state.leading = -ty;
                    }
                    state.move_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = matrix(operands) {
                    state.tm = m;
                    state.tlm = m;
                }
            }
            "T*" => state.next_line(),
            "Tj" => show_string(&mut state, operands.first(), &mut items),
            "'" => {
                state.next_line();
                show_string(&mut state, operands.first(), &mut items);
            }
            "\"" => {
                state.next_line();
                show_string(&mut state, operands.get(2), &mut items);
            }
            "TJ" => {
                if let Some(Object::Array(parts)) = operands.first() {
                    show_array(&mut state, parts, &mut items);
                }
            }
            _ => {}
        }
    }

    Ok(items)
}

fn show_string(state: &mut TextState, operand: Option<&Object>, items: &mut Vec<TextItem>) {
    if let Some(Object::String(bytes, _)) = operand {
        let text = decode_pdf_string(bytes);
        let advance = state.glyph_advance(&text);
        state.show(text, advance, items);
    }
}

fn show_array(state: &mut TextState, parts: &[Object], items: &mut Vec<TextItem>) {
    let mut text = String::new();
    let mut advance = 0.0;
    for part in parts {
        match part {
            Object::String(bytes, _) => {
                let chunk = decode_pdf_string(bytes);
                advance += state.glyph_advance(&chunk);
                text.push_str(&chunk);
            }
            other => {
                if let Some(kern) = number(other) {
                    advance -= kern / 1000.0 * state.font_size;
                    if kern < TJ_SPACE_THRESHOLD && !text.ends_with(' ') {
                        text.push(' ');
                    }
                }
            }
        }
    }
    state.show(text, advance, items);
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

fn numbers(operands: &[Object]) -> Vec<f64> {
    operands.iter().filter_map(number).collect()
}

fn matrix(operands: &[Object]) -> Option<Matrix> {
    match numbers(operands).as_slice() {
        &[a, b, c, d, e, f] => Some([a, b, c, d, e, f]),
        _ => None,
    }
}

/// UTF-16BE when BOM-prefixed, otherwise one byte per character.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let [0xFE, 0xFF, rest @ ..] = bytes {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes.iter().map(|&b| b as char).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Metadata & fallback
// ────────────────────────────────────────────────────────────────────────────

/// `BaseFont` names of every font dictionary, subset prefixes removed.
fn font_names(doc: &Document) -> Vec<String> {
    let mut fonts = BTreeSet::new();
    for object in doc.objects.values() {
        let Object::Dictionary(dict) = object else {
            continue;
        };
        let is_font = dict
            .get(b"Type")
            .and_then(|t| t.as_name())
            .map(|name| name == b"Font")
            .unwrap_or(false);
        if !is_font {
            continue;
        }
        if let Ok(name) = dict.get(b"BaseFont").and_then(|n| n.as_name()) {
            fonts.insert(strip_subset_prefix(&String::from_utf8_lossy(name)).to_string());
        }
    }
    fonts.into_iter().collect()
}

/// `ABCDEF+Helvetica` → `Helvetica`.
fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.chars().all(|c| c.is_ascii_uppercase()) => rest,
        _ => name,
    }
}

fn is_readable(text: &str) -> bool {
    text.chars().filter(|c| c.is_alphanumeric()).count() >= MIN_LAYER_CHARS
        && printable_ratio(text) > 0.7
}

fn flat_text(bytes: &[u8]) -> Option<String> {
    let owned = bytes.to_vec();
    // pdf-extract panics on some malformed inputs; contain it to this stage.
    match std::panic::catch_unwind(move || pdf_extract::extract_text_from_mem(&owned)) {
        Ok(Ok(text)) => Some(text),
        Ok(Err(e)) => {
            warn!(error = %e, "flat PDF extraction failed");
            None
        }
        Err(_) => {
            warn!("flat PDF extraction panicked");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::Operation;
    use lopdf::{dictionary, Stream};

    fn item(text: &str, x: f64, y: f64, width: f64) -> TextItem {
        TextItem {
            text: text.to_string(),
            x,
            y,
            width,
            height: 10.0,
        }
    }

    #[test]
    fn test_items_on_same_baseline_join_left_to_right() {
        let items = vec![item("Doe", 60.0, 700.0, 15.0), item("Jane", 10.0, 700.0, 20.0)];
        assert_eq!(reconstruct_page(&items, &PdfLayoutConfig::default()), "Jane Doe");
    }

    #[test]
    fn test_small_y_jitter_stays_on_line() {
        let items = vec![item("Acme", 10.0, 700.0, 20.0), item("Corp", 45.0, 697.0, 20.0)];
        assert_eq!(reconstruct_page(&items, &PdfLayoutConfig::default()), "Acme Corp");
    }

    #[test]
    fn test_lines_ordered_top_to_bottom() {
        let items = vec![
            item("second", 10.0, 680.0, 30.0),
            item("first", 10.0, 700.0, 25.0),
            item("third", 10.0, 660.0, 25.0),
        ];
        assert_eq!(
            reconstruct_page(&items, &PdfLayoutConfig::default()),
            "first\nsecond\nthird"
        );
    }

    #[test]
    fn test_adjacent_items_concatenate_without_space() {
        // Gap of 2 units is below the 10-unit glyph height.
        let items = vec![item("Engi", 10.0, 700.0, 20.0), item("neer", 32.0, 700.0, 20.0)];
        assert_eq!(reconstruct_page(&items, &PdfLayoutConfig::default()), "Engineer");
    }

    #[test]
    fn test_matrix_multiply_translation() {
        let m = multiply(&translate(10.0, 20.0), &translate(5.0, 5.0));
        assert_eq!(m, [1.0, 0.0, 0.0, 1.0, 15.0, 25.0]);
    }

    #[test]
    fn test_strip_subset_prefix() {
        assert_eq!(strip_subset_prefix("ABCDEF+Helvetica-Bold"), "Helvetica-Bold");
        assert_eq!(strip_subset_prefix("Times+Roman"), "Times+Roman");
        assert_eq!(strip_subset_prefix("Courier"), "Courier");
    }

    #[test]
    fn test_decode_utf16_string() {
        assert_eq!(decode_pdf_string(&[0xFE, 0xFF, 0x00, 0x4A, 0x00, 0xF6]), "Jö");
        assert_eq!(decode_pdf_string(b"Plain"), "Plain");
    }

    fn sample_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal("Jane Doe")]),
                Operation::new("Td", vec![0.into(), (-20).into()]),
                Operation::new("Tj", vec![Object::string_literal("Software Engineer at Acme Corp")]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_extract_generated_pdf() {
        let result = extract_pdf(&sample_pdf(), &PdfLayoutConfig::default()).unwrap();
        assert_eq!(result.page_count, 1);
        assert!(result.has_text_layer);
        assert_eq!(result.fonts, vec!["Courier".to_string()]);
        assert_eq!(result.text, "Jane Doe\nSoftware Engineer at Acme Corp");
    }
}
