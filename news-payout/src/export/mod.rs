pub mod csv_report;
pub mod pdf_report;

pub use csv_report::{render_csv, CSV_HEADER};
pub use pdf_report::{first_page_capacity, page_capacity, paginate, render_pdf, wrap_cell, PdfLayout, PdfRow, PDF_HEADER};

use crate::types::{Article, PayoutRate, Result, CSV_REPORT_FILE, PDF_REPORT_FILE};
use crate::utils::{display_date_in, normalized_author, normalized_description, title_or_empty};
use chrono::{Local, TimeZone};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// One report line, already normalized for output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub title: String,
    pub author: String,
    pub date: String,
    pub description: String,
    pub payout: String,
}

/// Rows for the current filtered set. The payout column repeats the rate
/// exactly as entered.
pub fn build_rows(articles: &[Article], rate: &PayoutRate) -> Vec<ReportRow> {
    build_rows_in(articles, rate, &Local)
}

pub fn build_rows_in<Tz: TimeZone>(articles: &[Article], rate: &PayoutRate, tz: &Tz) -> Vec<ReportRow>
where
    Tz::Offset: std::fmt::Display,
{
    articles
        .iter()
        .map(|article| ReportRow {
            title: title_or_empty(article).to_string(),
            author: normalized_author(article).to_string(),
            date: display_date_in(article, tz),
            description: normalized_description(article).to_string(),
            payout: rate.as_str().to_string(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub rows: usize,
}

/// Writes the payout report files into a fixed directory.
pub struct ReportExporter {
    output_dir: PathBuf,
}

impl ReportExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn export_csv(&self, articles: &[Article], rate: &PayoutRate) -> Result<ExportOutcome> {
        let rows = build_rows(articles, rate);
        let bytes = render_csv(&rows)?;
        self.write(CSV_REPORT_FILE, &bytes, rows.len())
    }

    pub fn export_pdf(&self, articles: &[Article], rate: &PayoutRate) -> Result<ExportOutcome> {
        let rows = build_rows(articles, rate);
        let bytes = render_pdf(&rows)?;
        self.write(PDF_REPORT_FILE, &bytes, rows.len())
    }

    fn write(&self, file_name: &str, bytes: &[u8], rows: usize) -> Result<ExportOutcome> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(file_name);
        fs::write(&path, bytes)?;
        info!("Exported {} rows to {} ({} bytes)", rows, path.display(), bytes.len());
        Ok(ExportOutcome { path, rows })
    }
}
