use crate::chart::{project, ChartSpec};
use crate::config::DashboardConfig;
use crate::context::AppContext;
use crate::export::{ExportOutcome, ReportExporter};
use crate::payout::{format_total, load_rate, total, update_rate};
use crate::store::{ArticleStore, FetchTicket};
use crate::types::{Article, AuthorCount, ChartKind, NewsError, PayoutRate, QueryParameters, Result};
use crate::utils::{display_date, normalized_author, normalized_description};
use chrono::NaiveDate;
use tracing::{debug, info};

/// What a single article card shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleCard {
    pub title: String,
    pub author: String,
    pub date: String,
    pub description: String,
}

impl ArticleCard {
    /// `None` for articles without a title.
    pub fn from_article(article: &Article) -> Option<Self> {
        let title = article.title.as_deref().filter(|t| !t.is_empty())?;
        Some(Self {
            title: title.to_string(),
            author: normalized_author(article).to_string(),
            date: display_date(article),
            description: normalized_description(article).to_string(),
        })
    }
}

/// Check `from <= to <= today` for whichever bounds are set.
pub fn check_date_range(from: Option<NaiveDate>, to: Option<NaiveDate>, today: NaiveDate) -> Result<()> {
    for date in [from, to].into_iter().flatten() {
        if date > today {
            return Err(NewsError::FutureDate { date, today });
        }
    }
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(NewsError::InvalidDateRange { from, to });
        }
    }
    Ok(())
}

/// Dashboard state for one signed-in session.
///
/// All recomputation happens synchronously inside the setters; the only
/// asynchronous edge is a fetch, bracketed by `begin_fetch` and
/// `complete_fetch`.
pub struct Dashboard {
    ctx: AppContext,
    params: QueryParameters,
    store: ArticleStore,
    rate: PayoutRate,
    chart_kind: ChartKind,
    exporter: ReportExporter,
}

impl Dashboard {
    pub fn new(ctx: AppContext, config: &DashboardConfig) -> Result<Self> {
        if !ctx.is_signed_in() {
            return Err(NewsError::NotSignedIn);
        }
        let rate = load_rate(ctx.store());

        Ok(Self {
            ctx,
            params: QueryParameters::new(config.default_query.clone()),
            store: ArticleStore::new(config.stale_responses),
            rate,
            chart_kind: ChartKind::default(),
            exporter: ReportExporter::new(config.export_dir.clone()),
        })
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut AppContext {
        &mut self.ctx
    }

    /// Tear down the session: forget the user and hand the context back.
    pub fn logout(mut self) -> Result<AppContext> {
        self.ctx.logout()?;
        Ok(self.ctx)
    }

    pub fn params(&self) -> &QueryParameters {
        &self.params
    }

    pub fn set_query(&mut self, query: impl Into<String>) -> &QueryParameters {
        self.params.query = query.into();
        &self.params
    }

    /// Rejected edits leave the parameters untouched.
    pub fn set_from(&mut self, from: Option<NaiveDate>, today: NaiveDate) -> Result<&QueryParameters> {
        check_date_range(from, self.params.to, today)?;
        self.params.from = from;
        Ok(&self.params)
    }

    pub fn set_to(&mut self, to: Option<NaiveDate>, today: NaiveDate) -> Result<&QueryParameters> {
        check_date_range(self.params.from, to, today)?;
        self.params.to = to;
        Ok(&self.params)
    }

    pub fn author_filter(&self) -> &str {
        self.store.author_filter()
    }

    pub fn set_author_filter(&mut self, author_filter: impl Into<String>) {
        self.store.set_author_filter(author_filter);
    }

    pub fn rate(&self) -> &PayoutRate {
        &self.rate
    }

    pub fn set_payout_rate(&mut self, input: &str) -> Result<&PayoutRate> {
        self.rate = update_rate(self.ctx.store_mut(), input)?;
        info!("Payout rate set to {}", self.rate);
        Ok(&self.rate)
    }

    pub fn total(&self) -> f64 {
        total(self.store.filtered().len(), &self.rate)
    }

    pub fn total_display(&self) -> String {
        format_total(self.total())
    }

    pub fn raw(&self) -> &[Article] {
        self.store.raw()
    }

    pub fn filtered(&self) -> &[Article] {
        self.store.filtered()
    }

    pub fn aggregation(&self) -> &[AuthorCount] {
        self.store.by_author()
    }

    pub fn cards(&self) -> Vec<ArticleCard> {
        self.store
            .filtered()
            .iter()
            .filter_map(ArticleCard::from_article)
            .collect()
    }

    pub fn loading(&self) -> bool {
        self.store.loading()
    }

    /// Mark a fetch for `params` as in flight.
    pub fn begin_fetch(&mut self, params: QueryParameters) -> FetchTicket {
        self.store.begin_fetch(params)
    }

    pub fn complete_fetch(&mut self, ticket: FetchTicket, articles: Vec<Article>) -> bool {
        self.store.complete_fetch(ticket, articles)
    }

    /// Load articles without going through a fetch ticket.
    pub fn load_articles(&mut self, articles: Vec<Article>) {
        self.store.replace_raw(articles);
    }

    pub fn chart_kind(&self) -> ChartKind {
        self.chart_kind
    }

    pub fn select_chart(&mut self, kind: ChartKind) {
        debug!("Chart projection {:?} -> {:?}", self.chart_kind, kind);
        self.chart_kind = kind;
    }

    pub fn chart(&self) -> ChartSpec {
        project(self.chart_kind, self.store.by_author())
    }

    pub fn export_csv(&self) -> Result<ExportOutcome> {
        self.exporter.export_csv(self.store.filtered(), &self.rate)
    }

    pub fn export_pdf(&self) -> Result<ExportOutcome> {
        self.exporter.export_pdf(self.store.filtered(), &self.rate)
    }
}
