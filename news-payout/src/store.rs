use crate::aggregator::group_by_author;
use crate::filter::filter_by_author;
use crate::types::{Article, AuthorCount, QueryParameters};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// What to do with a response that completes after a newer one was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StalePolicy {
    /// Drop it; the newer result stays on screen.
    #[default]
    Discard,
    /// Last completion wins, whatever order the requests went out in.
    Apply,
}

/// Issued when a fetch starts; handed back with its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub params: QueryParameters,
}

/// Last fetched articles plus the views derived from them.
///
/// `filtered` and `by_author` are never edited directly: they are rebuilt
/// whenever the raw set or the author filter changes.
#[derive(Debug, Default)]
pub struct ArticleStore {
    raw: Vec<Article>,
    filtered: Vec<Article>,
    by_author: Vec<AuthorCount>,
    author_filter: String,
    next_seq: u64,
    applied_seq: u64,
    in_flight: usize,
    stale_policy: StalePolicy,
}

impl ArticleStore {
    pub fn new(stale_policy: StalePolicy) -> Self {
        Self {
            stale_policy,
            ..Self::default()
        }
    }

    pub fn raw(&self) -> &[Article] {
        &self.raw
    }

    pub fn filtered(&self) -> &[Article] {
        &self.filtered
    }

    pub fn by_author(&self) -> &[AuthorCount] {
        &self.by_author
    }

    pub fn author_filter(&self) -> &str {
        &self.author_filter
    }

    /// True while at least one fetch is outstanding.
    pub fn loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn begin_fetch(&mut self, params: QueryParameters) -> FetchTicket {
        self.next_seq += 1;
        self.in_flight += 1;
        debug!("Fetch #{} started for {:?}", self.next_seq, params.query);
        FetchTicket {
            seq: self.next_seq,
            params,
        }
    }

    /// Apply a finished fetch. Returns false when the result was dropped as
    /// stale.
    pub fn complete_fetch(&mut self, ticket: FetchTicket, articles: Vec<Article>) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);

        if self.stale_policy == StalePolicy::Discard && ticket.seq < self.applied_seq {
            warn!(
                "Discarding fetch #{} ({} articles): #{} already applied",
                ticket.seq,
                articles.len(),
                self.applied_seq
            );
            return false;
        }

        self.applied_seq = self.applied_seq.max(ticket.seq);
        info!("Fetch #{} returned {} articles", ticket.seq, articles.len());
        self.replace_raw(articles);
        true
    }

    /// Swap in a new raw set wholesale and rebuild the derived views.
    pub fn replace_raw(&mut self, articles: Vec<Article>) {
        self.raw = articles;
        self.recompute();
    }

    pub fn set_author_filter(&mut self, author_filter: impl Into<String>) {
        self.author_filter = author_filter.into();
        self.recompute();
    }

    fn recompute(&mut self) {
        self.filtered = filter_by_author(&self.raw, &self.author_filter);
        self.by_author = group_by_author(&self.filtered);
    }
}
