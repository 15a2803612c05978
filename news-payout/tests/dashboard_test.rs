mod common;

use async_trait::async_trait;
use chrono::NaiveDate;
use common::{article, dashboard_config, init_tracing, sample_articles, signed_in_context};
use interfaces::memory::MemoryStore;
use news_payout::chart::{PRIMARY_COLOR, SECONDARY_COLOR};
use news_payout::config::DashboardConfig;
use news_payout::console::{parse_command, run_console, Command, ExportFormat};
use news_payout::payout::PAYOUT_RATE_KEY;
use news_payout::{
    AppContext, Article, ChartKind, Dashboard, KeyValueStore, NewsError, NewsSource, QueryParameters, StalePolicy,
    CSV_REPORT_FILE,
};
use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;
use tokio::time::Instant;
use tokio_test::{assert_err, assert_ok};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn dashboard() -> Dashboard {
    Dashboard::new(signed_in_context(), &DashboardConfig::default()).unwrap()
}

/// Serves the same articles for every query and records what was asked.
struct StaticSource {
    articles: Vec<Article>,
    requests: Mutex<Vec<QueryParameters>>,
}

impl StaticSource {
    fn new(articles: Vec<Article>) -> Arc<Self> {
        Arc::new(Self {
            articles,
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<QueryParameters> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl NewsSource for StaticSource {
    fn source_name(&self) -> String {
        "static".to_string()
    }

    async fn fetch(&self, params: &QueryParameters) -> Vec<Article> {
        self.requests.lock().unwrap().push(params.clone());
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.articles.clone()
    }
}

#[test]
fn refuses_to_open_without_user() {
    init_tracing();
    let ctx = AppContext::new(Box::new(MemoryStore::new()));

    match Dashboard::new(ctx, &DashboardConfig::default()) {
        Err(NewsError::NotSignedIn) => {}
        Err(e) => panic!("expected NotSignedIn, got {}", e),
        Ok(_) => panic!("dashboard opened without a user"),
    }
}

#[test]
fn opens_with_default_query_and_stored_rate() {
    let mut store = common::signed_in_store();
    store.set(PAYOUT_RATE_KEY, "2.5").unwrap();

    let dashboard = Dashboard::new(AppContext::new(Box::new(store)), &DashboardConfig::default()).unwrap();

    assert_eq!(dashboard.params(), &QueryParameters::new("tesla"));
    assert_eq!(dashboard.rate().as_str(), "2.5");
    assert_eq!(dashboard.chart_kind(), ChartKind::Line);
    assert!(!dashboard.loading());
    assert_eq!(dashboard.total_display(), "0.00");
}

#[test]
fn inverted_date_range_is_rejected() {
    let mut dashboard = dashboard();
    let today = date(2024, 3, 1);

    dashboard.set_from(Some(date(2024, 2, 10)), today).unwrap();
    let err = dashboard.set_to(Some(date(2024, 2, 1)), today).unwrap_err();

    assert!(matches!(err, NewsError::InvalidDateRange { .. }));
    assert_eq!(dashboard.params().from, Some(date(2024, 2, 10)));
    assert_eq!(dashboard.params().to, None);

    assert_ok!(dashboard.set_from(Some(date(2024, 2, 20)), today));
    assert_ok!(dashboard.set_to(Some(date(2024, 2, 20)), today));
    assert_err!(dashboard.set_from(Some(date(2024, 2, 21)), today));
}

#[test]
fn future_dates_are_rejected() {
    let mut dashboard = dashboard();
    let today = date(2024, 3, 1);

    let err = dashboard.set_to(Some(date(2024, 3, 2)), today).unwrap_err();
    assert!(matches!(err, NewsError::FutureDate { .. }));
    assert_err!(dashboard.set_from(Some(date(2025, 1, 1)), today));
    assert_ok!(dashboard.set_to(Some(today), today));
    assert_eq!(dashboard.params().from, None);
}

#[test]
fn clearing_dates_is_always_allowed() {
    let mut dashboard = dashboard();
    let today = date(2024, 3, 1);
    dashboard.set_from(Some(date(2024, 2, 1)), today).unwrap();
    dashboard.set_to(Some(date(2024, 2, 2)), today).unwrap();

    dashboard.set_from(None, today).unwrap();
    dashboard.set_to(None, today).unwrap();

    assert_eq!(dashboard.params().from, None);
    assert_eq!(dashboard.params().to, None);
}

#[test]
fn three_articles_at_five_total_fifteen() {
    let mut dashboard = dashboard();
    dashboard.load_articles(sample_articles()[..3].to_vec());

    assert_eq!(dashboard.rate().as_str(), "5");
    assert_eq!(dashboard.total_display(), "15.00");
}

#[test]
fn author_filter_drives_total_and_aggregation() {
    init_tracing();
    let mut dashboard = dashboard();
    dashboard.load_articles(sample_articles());

    dashboard.set_author_filter("smith");

    assert_eq!(dashboard.filtered().len(), 2);
    assert_eq!(dashboard.raw().len(), 5);
    assert_eq!(dashboard.total_display(), "10.00");
    let names: Vec<_> = dashboard.aggregation().iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Alice Smith", "alice smith"]);

    dashboard.set_payout_rate("1.5").unwrap();
    assert_eq!(dashboard.total_display(), "3.00");
    assert_eq!(dashboard.context().store().get(PAYOUT_RATE_KEY).as_deref(), Some("1.5"));
}

#[test]
fn bad_rate_keeps_previous_rate() {
    let mut dashboard = dashboard();
    dashboard.load_articles(sample_articles());

    assert!(matches!(dashboard.set_payout_rate("five"), Err(NewsError::InvalidRate(_))));
    assert_eq!(dashboard.rate().as_str(), "5");
    assert_eq!(dashboard.total_display(), "25.00");
}

#[test]
fn refetch_keeps_author_filter() {
    let mut dashboard = dashboard();
    dashboard.set_author_filter("bob");

    let ticket = dashboard.begin_fetch(dashboard.params().clone());
    assert!(dashboard.complete_fetch(ticket, sample_articles()));

    assert_eq!(dashboard.author_filter(), "bob");
    assert_eq!(dashboard.filtered().len(), 1);
}

#[test]
fn stale_response_is_discarded_by_default() {
    init_tracing();
    let mut dashboard = dashboard();

    let older = dashboard.begin_fetch(QueryParameters::new("old"));
    let newer = dashboard.begin_fetch(QueryParameters::new("new"));
    assert!(dashboard.loading());

    assert!(dashboard.complete_fetch(newer, vec![article(Some("New"), "fresh")]));
    assert!(dashboard.loading());
    assert!(!dashboard.complete_fetch(older, vec![article(Some("Old"), "stale")]));
    assert!(!dashboard.loading());

    assert_eq!(dashboard.raw()[0].author.as_deref(), Some("New"));
}

#[test]
fn stale_response_applies_when_configured() {
    let config = DashboardConfig {
        stale_responses: StalePolicy::Apply,
        ..DashboardConfig::default()
    };
    let mut dashboard = Dashboard::new(signed_in_context(), &config).unwrap();

    let older = dashboard.begin_fetch(QueryParameters::new("old"));
    let newer = dashboard.begin_fetch(QueryParameters::new("new"));
    dashboard.complete_fetch(newer, vec![article(Some("New"), "fresh")]);

    assert!(dashboard.complete_fetch(older, vec![article(Some("Old"), "stale")]));
    assert_eq!(dashboard.raw()[0].author.as_deref(), Some("Old"));
}

#[test]
fn empty_fetch_result_clears_views() {
    let mut dashboard = dashboard();
    dashboard.load_articles(sample_articles());

    let ticket = dashboard.begin_fetch(dashboard.params().clone());
    dashboard.complete_fetch(ticket, Vec::new());

    assert!(dashboard.filtered().is_empty());
    assert!(dashboard.aggregation().is_empty());
    assert!(dashboard.cards().is_empty());
    assert_eq!(dashboard.total_display(), "0.00");
}

#[test]
fn switching_charts_leaves_aggregation_alone() {
    let mut dashboard = dashboard();
    dashboard.load_articles(sample_articles());
    let before = dashboard.aggregation().to_vec();

    for kind in [ChartKind::Bar, ChartKind::Pie, ChartKind::Line] {
        dashboard.select_chart(kind);
        let chart = dashboard.chart();
        assert_eq!(chart.kind, kind);
        assert_eq!(chart.total(), dashboard.filtered().len());
    }

    assert_eq!(dashboard.aggregation(), before.as_slice());
}

#[test]
fn pie_slices_alternate_colors() {
    let mut dashboard = dashboard();
    dashboard.load_articles(sample_articles());
    dashboard.select_chart(ChartKind::Pie);

    let colors: Vec<_> = dashboard.chart().points.iter().map(|p| p.color).collect();

    assert_eq!(
        colors,
        vec![PRIMARY_COLOR, SECONDARY_COLOR, PRIMARY_COLOR, SECONDARY_COLOR, PRIMARY_COLOR]
    );
}

#[test]
fn cards_skip_untitled_articles() {
    let mut dashboard = dashboard();
    let mut untitled = article(Some("Eve"), "ignored");
    untitled.title = None;
    let mut bare = article(None, "Bare");
    bare.description = None;
    dashboard.load_articles(vec![untitled, bare]);

    let cards = dashboard.cards();

    assert_eq!(dashboard.filtered().len(), 2);
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].title, "Bare");
    assert_eq!(cards[0].author, "Unknown");
    assert_eq!(cards[0].description, "No description available");
}

#[test]
fn logout_returns_signed_out_context() {
    let dashboard = dashboard();

    let ctx = dashboard.logout().unwrap();

    assert!(!ctx.is_signed_in());
    assert!(Dashboard::new(ctx, &DashboardConfig::default()).is_err());
}

#[test]
fn console_commands_parse() {
    assert_eq!(parse_command("q rust lang").unwrap(), Command::Query("rust lang".to_string()));
    assert_eq!(parse_command("from 2024-02-01").unwrap(), Command::From(Some(date(2024, 2, 1))));
    assert_eq!(parse_command("to -").unwrap(), Command::To(None));
    assert_eq!(parse_command("author").unwrap(), Command::Author(String::new()));
    assert_eq!(parse_command("chart PIE").unwrap(), Command::Chart(ChartKind::Pie));
    assert_eq!(parse_command("export pdf").unwrap(), Command::Export(ExportFormat::Pdf));
    assert!(parse_command("from yesterday").is_err());
    assert!(parse_command("chart radar").is_err());
    assert!(parse_command("dance").is_err());
}

#[tokio::test(start_paused = true)]
async fn console_session_fetches_filters_and_exports() {
    init_tracing();
    let dir = tempdir().unwrap();
    let dashboard = Dashboard::new(signed_in_context(), &dashboard_config(dir.path())).unwrap();
    let source = StaticSource::new(sample_articles());
    let script = "author alice\nwait\nrate 2\nexport csv\nquit\n";
    let mut output = Vec::new();

    let dashboard = run_console(
        dashboard,
        source.clone(),
        Duration::from_millis(500),
        script.as_bytes(),
        &mut output,
    )
    .await
    .unwrap();

    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("0 articles match, Total Payout: $0.00"), "{}", text);
    assert!(text.contains("Fetch #1: 2 articles, Total Payout: $10.00"), "{}", text);
    assert!(text.contains("Total Payout: $4.00"), "{}", text);
    assert!(text.contains("Wrote 2 rows to"), "{}", text);

    assert_eq!(source.requests(), vec![QueryParameters::new("tesla")]);
    assert_eq!(dashboard.filtered().len(), 2);
    assert_eq!(dashboard.rate().as_str(), "2");
    let csv = fs::read_to_string(dir.path().join(CSV_REPORT_FILE)).unwrap();
    assert_eq!(csv.lines().count(), 3);
}

#[tokio::test(start_paused = true)]
async fn console_coalesces_rapid_query_edits() {
    init_tracing();
    let dir = tempdir().unwrap();
    let dashboard = Dashboard::new(signed_in_context(), &dashboard_config(dir.path())).unwrap();
    let source = StaticSource::new(sample_articles());
    let script = "q r\nq ru\nq rust\nwait\n";
    let mut output = Vec::new();

    let dashboard = run_console(
        dashboard,
        source.clone(),
        Duration::from_millis(500),
        script.as_bytes(),
        &mut output,
    )
    .await
    .unwrap();

    assert_eq!(source.requests(), vec![QueryParameters::new("rust")]);
    assert_eq!(dashboard.raw().len(), 5);
    assert!(!dashboard.loading());
}

#[tokio::test(start_paused = true)]
async fn console_reports_bad_input_and_carries_on() {
    init_tracing();
    let dashboard = dashboard();
    let source = StaticSource::new(Vec::new());
    let script = "to 2999-01-01\nrate lots\nchart bar\ntheme\nquit\n";
    let mut output = Vec::new();

    let dashboard = run_console(
        dashboard,
        source,
        Duration::from_millis(500),
        script.as_bytes(),
        &mut output,
    )
    .await
    .unwrap();

    let text = String::from_utf8(output).unwrap();
    assert_eq!(text.matches("error:").count(), 2, "{}", text);
    assert!(text.contains("Theme: dark"), "{}", text);
    assert_eq!(dashboard.params().to, None);
    assert_eq!(dashboard.chart_kind(), ChartKind::Bar);
    assert_eq!(dashboard.rate().as_str(), "5");
}

#[tokio::test(start_paused = true)]
async fn console_fetch_skips_the_debounce_window() {
    init_tracing();
    let dir = tempdir().unwrap();
    let dashboard = Dashboard::new(signed_in_context(), &dashboard_config(dir.path())).unwrap();
    let source = StaticSource::new(sample_articles());
    let script = "fetch\nwait\nquit\n";
    let mut output = Vec::new();
    let start = Instant::now();

    let dashboard = run_console(
        dashboard,
        source.clone(),
        Duration::from_millis(500),
        script.as_bytes(),
        &mut output,
    )
    .await
    .unwrap();

    assert!(start.elapsed() < Duration::from_millis(500), "{:?}", start.elapsed());
    assert_eq!(source.requests(), vec![QueryParameters::new("tesla")]);
    assert_eq!(dashboard.raw().len(), 5);
    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("Fetch #1: 5 articles, Total Payout: $25.00"), "{}", text);
}

#[tokio::test(start_paused = true)]
async fn console_survives_failed_export() {
    init_tracing();
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, "plain file").unwrap();
    let dashboard = Dashboard::new(signed_in_context(), &dashboard_config(&blocker)).unwrap();
    let source = StaticSource::new(sample_articles());
    let script = "wait\nexport csv\nexport pdf\ntheme\nquit\n";
    let mut output = Vec::new();

    let result = run_console(
        dashboard,
        source,
        Duration::from_millis(500),
        script.as_bytes(),
        &mut output,
    )
    .await;

    let text = String::from_utf8(output).unwrap();
    assert!(result.is_ok(), "{}", text);
    assert_eq!(text.matches("error:").count(), 2, "{}", text);
    assert!(!text.contains("Wrote"), "{}", text);
    assert!(text.contains("Theme: dark"), "{}", text);
}
