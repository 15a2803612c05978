use super::ReportRow;
use crate::types::{NewsError, Result};

pub const CSV_HEADER: [&str; 5] = ["Title", "Author", "Date", "Description", "Payout"];

/// UTF-8 CSV with a header row and CRLF line endings.
pub fn render_csv(rows: &[ReportRow]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for row in rows {
        writer.write_record([
            row.title.as_str(),
            row.author.as_str(),
            row.date.as_str(),
            row.description.as_str(),
            row.payout.as_str(),
        ])?;
    }

    writer.into_inner().map_err(|e| NewsError::Io(e.into_error()))
}
