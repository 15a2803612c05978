use crate::types::Article;
use crate::utils::normalized_author;
use tracing::debug;

/// Keep the articles whose normalized author contains `author_filter`,
/// ignoring case. An empty filter keeps everything.
pub fn filter_by_author(articles: &[Article], author_filter: &str) -> Vec<Article> {
    if author_filter.is_empty() {
        return articles.to_vec();
    }

    let needle = author_filter.to_lowercase();
    let filtered: Vec<Article> = articles
        .iter()
        .filter(|article| author_matches(article, &needle))
        .cloned()
        .collect();

    debug!(
        "Author filter {:?} kept {}/{} articles",
        author_filter,
        filtered.len(),
        articles.len()
    );
    filtered
}

/// `needle` must already be lowercase.
fn author_matches(article: &Article, needle: &str) -> bool {
    normalized_author(article).to_lowercase().contains(needle)
}
