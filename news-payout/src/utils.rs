use crate::types::{Article, INVALID_DATE, NO_DESCRIPTION, UNKNOWN_AUTHOR};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};

/// Author label used for grouping, filtering and export. Missing and empty
/// authors collapse to "Unknown".
pub fn normalized_author(article: &Article) -> &str {
    match article.author.as_deref() {
        Some(author) if !author.is_empty() => author,
        _ => UNKNOWN_AUTHOR,
    }
}

pub fn normalized_description(article: &Article) -> &str {
    match article.description.as_deref() {
        Some(description) if !description.is_empty() => description,
        _ => NO_DESCRIPTION,
    }
}

pub fn normalized_source(article: &Article) -> &str {
    article
        .source
        .as_ref()
        .and_then(|s| s.name.as_deref())
        .filter(|name| !name.is_empty())
        .unwrap_or("Unknown")
}

pub fn title_or_empty(article: &Article) -> &str {
    article.title.as_deref().unwrap_or("")
}

/// Parse an ISO-8601 timestamp. Accepts RFC 3339 and bare dates.
pub fn parse_published_at(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Locale-style short date (`M/D/YYYY`) in the machine's local zone.
pub fn display_date(article: &Article) -> String {
    display_date_in(article, &Local)
}

pub fn display_date_in<Tz: TimeZone>(article: &Article, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match parse_published_at(article.published_at.as_deref()) {
        Some(ts) => ts.with_timezone(tz).format("%-m/%-d/%Y").to_string(),
        None => INVALID_DATE.to_string(),
    }
}

/// Today's date in the local zone, the upper bound for date pickers.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Cut `text` to at most `max_chars` characters, marking the cut with "...".
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}
