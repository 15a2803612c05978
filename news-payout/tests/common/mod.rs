#![allow(dead_code)]

// Shared fixtures for the news-payout integration tests
use interfaces::memory::MemoryStore;
use news_payout::config::DashboardConfig;
use news_payout::session::save_user;
use news_payout::{AppContext, Article, ArticleSource, Identity};
use std::path::Path;
use std::sync::Once;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn article(author: Option<&str>, title: &str) -> Article {
    Article {
        source: Some(ArticleSource {
            id: None,
            name: Some("Example Wire".to_string()),
        }),
        author: author.map(str::to_string),
        title: Some(title.to_string()),
        description: Some(format!("About {}", title)),
        url: Some(format!("https://example.com/{}", title.replace(' ', "-"))),
        url_to_image: None,
        published_at: Some("2024-03-05T12:00:00Z".to_string()),
        content: None,
    }
}

pub fn sample_articles() -> Vec<Article> {
    vec![
        article(Some("Alice Smith"), "Rust 2024 ships"),
        article(Some("Bob Jones"), "Markets rally"),
        article(None, "Anonymous tip"),
        article(Some("alice smith"), "Cargo tricks"),
        article(Some("Carol"), "Weather report"),
    ]
}

pub fn test_identity() -> Identity {
    Identity {
        uid: "uid-123".to_string(),
        email: Some("reader@example.com".to_string()),
        display_name: None,
        provider_id: "password".to_string(),
        id_token: "token".to_string(),
        refresh_token: Some("refresh".to_string()),
    }
}

pub fn signed_in_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    save_user(&mut store, &test_identity()).expect("save user");
    store
}

pub fn signed_in_context() -> AppContext {
    AppContext::new(Box::new(signed_in_store()))
}

pub fn dashboard_config(export_dir: &Path) -> DashboardConfig {
    DashboardConfig {
        export_dir: export_dir.to_path_buf(),
        ..DashboardConfig::default()
    }
}
