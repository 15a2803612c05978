mod common;

use chrono::Utc;
use common::{article, init_tracing, sample_articles};
use news_payout::export::{
    build_rows_in, first_page_capacity, page_capacity, paginate, render_csv, render_pdf, wrap_cell, ReportRow,
};
use news_payout::filter::filter_by_author;
use news_payout::{PayoutRate, ReportExporter, CSV_REPORT_FILE, PDF_REPORT_FILE};
use std::fs;
use tempfile::tempdir;

fn rows(articles: &[news_payout::Article], rate: &str) -> Vec<ReportRow> {
    build_rows_in(articles, &PayoutRate::parse(rate).unwrap(), &Utc)
}

fn csv_text(rows: &[ReportRow]) -> String {
    String::from_utf8(render_csv(rows).unwrap()).unwrap()
}

#[test]
fn csv_starts_with_exact_header() {
    init_tracing();
    let text = csv_text(&rows(&sample_articles(), "5"));

    assert!(text.starts_with("Title,Author,Date,Description,Payout\r\n"));
}

#[test]
fn csv_has_one_line_per_filtered_article() {
    init_tracing();
    let articles = sample_articles();
    let filtered = filter_by_author(&articles, "alice");

    let text = csv_text(&rows(&filtered, "5"));

    let lines: Vec<&str> = text.split("\r\n").filter(|line| !line.is_empty()).collect();
    assert_eq!(lines.len(), filtered.len() + 1);
    assert_eq!(lines[1], "Rust 2024 ships,Alice Smith,3/5/2024,About Rust 2024 ships,5");
    assert_eq!(lines[2], "Cargo tricks,alice smith,3/5/2024,About Cargo tricks,5");
}

#[test]
fn csv_quotes_fields_with_commas_and_quotes() {
    let mut tricky = article(Some("Smith, Alice"), "Rust, \"fast\" and safe");
    tricky.description = None;

    let text = csv_text(&rows(&[tricky], "5"));

    let line = text.lines().nth(1).unwrap();
    assert_eq!(
        line,
        "\"Rust, \"\"fast\"\" and safe\",\"Smith, Alice\",3/5/2024,No description available,5"
    );
}

#[test]
fn rows_normalize_missing_fields() {
    let mut bare = article(None, "Bare");
    bare.title = None;
    bare.description = Some(String::new());
    bare.published_at = Some("yesterday".to_string());

    let row = &rows(&[bare], "2.5")[0];

    assert_eq!(row.title, "");
    assert_eq!(row.author, "Unknown");
    assert_eq!(row.date, "Invalid Date");
    assert_eq!(row.description, "No description available");
    assert_eq!(row.payout, "2.5");
}

#[test]
fn payout_column_repeats_rate_as_entered() {
    let row = &rows(&sample_articles(), "0.126")[0];

    assert_eq!(row.payout, "0.126");
}

#[test]
fn bare_dates_are_accepted() {
    let mut dated = article(Some("Dan"), "Dated");
    dated.published_at = Some("2024-12-31".to_string());

    assert_eq!(rows(&[dated], "5")[0].date, "12/31/2024");
}

#[test]
fn empty_report_keeps_header_only() {
    let text = csv_text(&[]);

    assert_eq!(text, "Title,Author,Date,Description,Payout\r\n");
}

#[test]
fn pagination_fills_first_page_then_full_pages() {
    let article = article(Some("Alice"), "Row");
    let many: Vec<_> = std::iter::repeat(article).take(80).collect();

    let layout = paginate(&rows(&many, "5"));

    assert_eq!(first_page_capacity(), 37);
    assert_eq!(page_capacity(), 38);
    let sizes: Vec<usize> = layout.pages.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![37, 38, 5]);
    assert_eq!(layout.row_count(), 80);
}

#[test]
fn empty_pdf_still_has_a_page() {
    let layout = paginate(&[]);

    assert_eq!(layout.pages.len(), 1);
    assert_eq!(layout.row_count(), 0);
}

const LONG_TITLE: &str =
    "Tesla shares jump after record quarter deliveries beat Wall Street expectations";

#[test]
fn long_cells_wrap_without_losing_text() {
    let lines = wrap_cell(LONG_TITLE, 52);

    assert!(lines.len() > 1);
    assert!(lines.iter().all(|line| line.chars().count() <= 52));
    assert_eq!(lines.join(" "), LONG_TITLE);

    let unbroken = "x".repeat(30);
    assert_eq!(wrap_cell(&unbroken, 12), vec!["x".repeat(12), "x".repeat(12), "x".repeat(6)]);
    assert_eq!(wrap_cell("", 12), vec![String::new()]);
}

#[test]
fn tall_rows_take_more_page_space() {
    let long = article(Some("Alice"), &LONG_TITLE.repeat(3));
    let many: Vec<_> = std::iter::repeat(long).take(40).collect();

    let layout = paginate(&rows(&many, "5"));

    assert!(layout.pages[0].len() < first_page_capacity());
    assert!(layout.pages[0][0].line_count() > 1);
    assert_eq!(layout.row_count(), 40);
    assert!(layout.pages.iter().all(|page| !page.is_empty()));
}

#[test]
fn pdf_text_keeps_full_title() {
    let row = &rows(&[article(Some("Alice"), LONG_TITLE)], "5");

    let bytes = render_pdf(row).unwrap();

    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    let text = doc.extract_text(&[1]).unwrap();
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    assert!(flat.contains(LONG_TITLE), "{}", flat);
    assert!(flat.contains("News Payout Report"), "{}", flat);
    assert!(!flat.contains("..."), "{}", flat);
}

#[test]
fn exporter_writes_both_files() {
    init_tracing();
    let dir = tempdir().unwrap();
    let exporter = ReportExporter::new(dir.path().join("reports"));
    let articles = sample_articles();
    let rate = PayoutRate::parse("5").unwrap();

    let csv = exporter.export_csv(&articles, &rate).unwrap();
    let pdf = exporter.export_pdf(&articles, &rate).unwrap();

    assert_eq!(csv.path, dir.path().join("reports").join(CSV_REPORT_FILE));
    assert_eq!(csv.rows, articles.len());
    let written = fs::read_to_string(&csv.path).unwrap();
    assert_eq!(written.lines().count(), articles.len() + 1);

    assert_eq!(pdf.path, dir.path().join("reports").join(PDF_REPORT_FILE));
    assert_eq!(pdf.rows, articles.len());
    let bytes = fs::read(&pdf.path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn multi_page_pdf_renders() {
    let dir = tempdir().unwrap();
    let exporter = ReportExporter::new(dir.path());
    let many: Vec<_> = std::iter::repeat(article(Some("Alice"), "Row")).take(120).collect();

    let outcome = exporter.export_pdf(&many, &PayoutRate::default()).unwrap();

    assert_eq!(outcome.rows, 120);
    assert!(fs::metadata(&outcome.path).unwrap().len() > 0);
}
