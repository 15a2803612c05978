use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
// Use the interfaces crate for the collaborator contracts
pub use interfaces::defs::{Article, ArticleSource, Identity, IdpProvider, QueryParameters};
pub use interfaces::defs::{AuthError, IdentityProvider, KeyValueStore, NewsSource};

pub const UNKNOWN_AUTHOR: &str = "Unknown";
pub const NO_DESCRIPTION: &str = "No description available";
pub const INVALID_DATE: &str = "Invalid Date";

pub const CSV_REPORT_FILE: &str = "news-payout-report.csv";
pub const PDF_REPORT_FILE: &str = "news-payout-report.pdf";
pub const REPORT_TITLE: &str = "News Payout Report";

/// HTTP settings for the news search API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub base_url: String,
    pub api_key: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub page_size: u32,
    pub sort_by: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://newsapi.org/v2/".to_string(),
            api_key: String::new(),
            user_agent: "News-Payout/1.0".to_string(),
            timeout_seconds: 30,
            page_size: 100,
            sort_by: "publishedAt".to_string(),
        }
    }
}

/// One chart series point: a distinct author and how many filtered
/// articles carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorCount {
    pub name: String,
    pub count: usize,
}

/// Which field the aggregation groups on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Author,
    Source,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    #[default]
    Line,
    Bar,
    Pie,
}

impl std::str::FromStr for ChartKind {
    type Err = NewsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "line" => Ok(ChartKind::Line),
            "bar" => Ok(ChartKind::Bar),
            "pie" => Ok(ChartKind::Pie),
            other => Err(NewsError::General(format!("Unknown chart type: {}", other))),
        }
    }
}

/// Per-article payout. Keeps the text the user entered so exports can
/// repeat it unrounded.
#[derive(Debug, Clone, PartialEq)]
pub struct PayoutRate {
    value: f64,
    raw: String,
}

impl PayoutRate {
    pub const DEFAULT: &'static str = "5";

    pub fn parse(input: &str) -> Result<Self> {
        let raw = input.trim();
        let value: f64 = raw
            .parse()
            .map_err(|_| NewsError::InvalidRate(input.to_string()))?;
        if !value.is_finite() {
            return Err(NewsError::InvalidRate(input.to_string()));
        }
        Ok(Self {
            value,
            raw: raw.to_string(),
        })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Default for PayoutRate {
    fn default() -> Self {
        Self {
            value: 5.0,
            raw: Self::DEFAULT.to_string(),
        }
    }
}

impl std::fmt::Display for PayoutRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NewsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("News API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Invalid date range: from {from} is after to {to}")]
    InvalidDateRange { from: NaiveDate, to: NaiveDate },

    #[error("Date {date} is in the future (today is {today})")]
    FutureDate { date: NaiveDate, today: NaiveDate },

    #[error("Invalid payout rate: {0:?}")]
    InvalidRate(String),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, NewsError>;
