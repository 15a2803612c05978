use crate::types::{Article, AuthorCount, GroupKey};
use crate::utils::{normalized_author, normalized_source};
use indexmap::IndexMap;
use tracing::debug;

/// Count articles per group, keyed by the normalized field value.
///
/// Groups come out in the order their key is first seen, so the same input
/// always yields the same series. Keys are not case-folded: "Alice" and
/// "alice" are two groups.
pub fn group_by(articles: &[Article], key: GroupKey) -> IndexMap<String, usize> {
    let mut groups: IndexMap<String, usize> = IndexMap::new();
    for article in articles {
        let value = match key {
            GroupKey::Author => normalized_author(article),
            GroupKey::Source => normalized_source(article),
        };
        *groups.entry(value.to_string()).or_insert(0) += 1;
    }
    groups
}

/// Chart-ready author series for the filtered set.
pub fn group_by_author(articles: &[Article]) -> Vec<AuthorCount> {
    let series = to_series(group_by(articles, GroupKey::Author));
    debug!("Aggregated {} articles into {} author groups", articles.len(), series.len());
    series
}

pub fn to_series(groups: IndexMap<String, usize>) -> Vec<AuthorCount> {
    groups
        .into_iter()
        .map(|(name, count)| AuthorCount { name, count })
        .collect()
}
