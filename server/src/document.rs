//! PDF rendering of confirmation documents.

use printpdf::{BuiltinFont, Mm, PdfDocument};
use registry_core::{Confirmation, DocumentError, DocumentRenderer};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 25.4;
const FONT_SIZE_PT: f32 = 12.0;
const LINE_HEIGHT_MM: f32 = 6.0;

/// Characters per line that fit the 160 mm text width at 12 pt Helvetica,
/// assuming an average glyph width of 0.5 em (2.1 mm).
const WRAP_COLUMNS: usize = 75;

/// Renders a one-page A4 PDF listing the confirmation fields in Helvetica.
///
/// Fields longer than the text width wrap onto following lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfRenderer;

impl PdfRenderer {
    /// Create a new renderer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl DocumentRenderer for PdfRenderer {
    fn render(&self, confirmation: &Confirmation) -> Result<Vec<u8>, DocumentError> {
        let (doc, page, layer) = PdfDocument::new(
            "Media Details",
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            "Layer 1",
        );
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| DocumentError(format!("{e:?}")))?;
        let layer = doc.get_page(page).get_layer(layer);

        let mut y = PAGE_HEIGHT_MM - MARGIN_MM;
        for line in confirmation.lines() {
            for segment in wrap(&line, WRAP_COLUMNS) {
                layer.use_text(segment, FONT_SIZE_PT, Mm(MARGIN_MM), Mm(y), &font);
                y -= LINE_HEIGHT_MM;
            }
        }

        doc.save_to_bytes()
            .map_err(|e| DocumentError(format!("{e:?}")))
    }
}

/// Splits `line` into segments of at most `columns` characters, breaking at
/// whitespace where possible and inside words longer than a full line.
fn wrap(line: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut segments = Vec::new();
    let mut current = String::new();

    for word in line.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        let current_len = current.chars().count();

        if current_len > 0 && current_len + 1 + word.len() <= columns {
            current.push(' ');
            current.extend(word.iter());
            continue;
        }
        if current_len > 0 {
            segments.push(std::mem::take(&mut current));
        }
        while word.len() > columns {
            let rest = word.split_off(columns);
            segments.push(word.into_iter().collect());
            word = rest;
        }
        current.extend(word.iter());
    }

    if !current.is_empty() || segments.is_empty() {
        segments.push(current);
    }
    segments
}
