use super::ReportRow;
use crate::types::{NewsError, Result, REPORT_TITLE};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use tracing::debug;

pub const PDF_HEADER: [&str; 4] = ["Title", "Author", "Date", "Payout"];

// A4 portrait, millimetres.
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const LEFT_MARGIN: f32 = 14.0;
const TITLE_BASELINE: f32 = PAGE_HEIGHT - 10.0;
const FIRST_TABLE_TOP: f32 = PAGE_HEIGHT - 20.0;
const TABLE_TOP: f32 = PAGE_HEIGHT - 15.0;
const BOTTOM_MARGIN: f32 = 15.0;
/// Baseline distance between two single-line rows.
const ROW_HEIGHT: f32 = 7.0;
/// Baseline distance between wrapped lines inside one cell.
const LINE_HEIGHT: f32 = 4.0;

const TITLE_SIZE: f32 = 16.0;
const CELL_SIZE: f32 = 9.0;

/// Column x offsets from the left margin, and how many characters fit on
/// one line of the column.
const COLUMNS: [(f32, usize); 4] = [(0.0, 52), (92.0, 26), (140.0, 12), (166.0, 12)];

/// One table row with every cell wrapped to its column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfRow {
    pub cells: [Vec<String>; 4],
}

impl PdfRow {
    pub fn from_report(row: &ReportRow) -> Self {
        let texts = [
            row.title.as_str(),
            row.author.as_str(),
            row.date.as_str(),
            row.payout.as_str(),
        ];
        Self {
            cells: std::array::from_fn(|i| wrap_cell(texts[i], COLUMNS[i].1)),
        }
    }

    /// Lines taken by the tallest cell.
    pub fn line_count(&self) -> usize {
        self.cells.iter().map(Vec::len).max().unwrap_or(1).max(1)
    }

    /// Vertical space from this row's first baseline to the next row's.
    pub fn height(&self) -> f32 {
        ROW_HEIGHT + (self.line_count() - 1) as f32 * LINE_HEIGHT
    }

    fn depth(&self) -> f32 {
        (self.line_count() - 1) as f32 * LINE_HEIGHT
    }
}

/// Rows split across pages. The table header repeats on every page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfLayout {
    pub pages: Vec<Vec<PdfRow>>,
}

impl PdfLayout {
    pub fn row_count(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }
}

/// Word-wrap `text` to lines of at most `max_chars` characters. Words longer
/// than a line are split. Nothing is dropped.
pub fn wrap_cell(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
        if needed > max_chars && current_len > 0 {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }

    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Single-line rows that fit below a header whose baseline sits at `top`.
fn rows_below(top: f32) -> usize {
    let usable = top - ROW_HEIGHT - BOTTOM_MARGIN;
    (usable / ROW_HEIGHT).floor() as usize + 1
}

pub fn first_page_capacity() -> usize {
    rows_below(FIRST_TABLE_TOP)
}

pub fn page_capacity() -> usize {
    rows_below(TABLE_TOP)
}

/// Lay rows out page by page, breaking when the next row's last line would
/// fall into the bottom margin. There is always at least one page, even for
/// an empty report, and every page holds at least one row.
pub fn paginate(rows: &[ReportRow]) -> PdfLayout {
    let mut pages = Vec::new();
    let mut page = Vec::new();
    let mut top = FIRST_TABLE_TOP;
    let mut y = top - ROW_HEIGHT;

    for row in rows.iter().map(PdfRow::from_report) {
        if !page.is_empty() && y - row.depth() < BOTTOM_MARGIN {
            pages.push(std::mem::take(&mut page));
            top = TABLE_TOP;
            y = top - ROW_HEIGHT;
        }
        y -= row.height();
        page.push(row);
    }
    pages.push(page);

    PdfLayout { pages }
}

pub fn render_pdf(rows: &[ReportRow]) -> Result<Vec<u8>> {
    let layout = paginate(rows);
    debug!("Rendering {} rows over {} PDF pages", layout.row_count(), layout.pages.len());

    let (doc, first_page, first_layer) =
        PdfDocument::new(REPORT_TITLE, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_error)?;
    let header = PdfRow {
        cells: PDF_HEADER.map(|label| vec![label.to_string()]),
    };

    for (index, page_rows) in layout.pages.iter().enumerate() {
        let (page, layer) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), format!("Page {}", index + 1))
        };
        let canvas = doc.get_page(page).get_layer(layer);

        let top = if index == 0 {
            canvas.use_text(REPORT_TITLE, TITLE_SIZE, Mm(LEFT_MARGIN), Mm(TITLE_BASELINE), &bold);
            FIRST_TABLE_TOP
        } else {
            TABLE_TOP
        };

        write_row(&canvas, &header, top, &bold);
        let mut y = top - ROW_HEIGHT;
        for row in page_rows {
            write_row(&canvas, row, y, &regular);
            y -= row.height();
        }
    }

    doc.save_to_bytes().map_err(pdf_error)
}

fn write_row(canvas: &PdfLayerReference, row: &PdfRow, y: f32, font: &IndirectFontRef) {
    for (lines, (offset, _)) in row.cells.iter().zip(COLUMNS) {
        for (i, line) in lines.iter().enumerate() {
            canvas.use_text(
                line.as_str(),
                CELL_SIZE,
                Mm(LEFT_MARGIN + offset),
                Mm(y - i as f32 * LINE_HEIGHT),
                font,
            );
        }
    }
}

fn pdf_error(e: impl std::fmt::Display) -> NewsError {
    NewsError::Pdf(e.to_string())
}
