use crate::types::{Article, FetchConfig, NewsError, NewsSource, QueryParameters, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use url::Url;

/// Body of `GET /everything`. Errors come back with `status: "error"`.
#[derive(Debug, Deserialize)]
struct EverythingResponse {
    status: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
    code: Option<String>,
    message: Option<String>,
}

/// Client for the news search API's `everything` endpoint.
pub struct NewsApiFetcher {
    client: Client,
    config: FetchConfig,
}

impl NewsApiFetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()?;

        Ok(Self { client, config })
    }

    /// Full request URL for `params`. Unset dates are left out.
    pub fn build_url(&self, params: &QueryParameters) -> Result<Url> {
        let mut base = self.config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let mut url = Url::parse(&base)?.join("everything")?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", &params.query);
            if let Some(from) = params.from {
                pairs.append_pair("from", &from.format("%Y-%m-%d").to_string());
            }
            if let Some(to) = params.to {
                pairs.append_pair("to", &to.format("%Y-%m-%d").to_string());
            }
            pairs.append_pair("sortBy", &self.config.sort_by);
            pairs.append_pair("pageSize", &self.config.page_size.to_string());
            pairs.append_pair("apiKey", &self.config.api_key);
        }

        Ok(url)
    }

    /// Run one query and surface any failure as an error.
    pub async fn try_fetch(&self, params: &QueryParameters) -> Result<Vec<Article>> {
        let start_time = Instant::now();
        let url = self.build_url(params)?;
        debug!("Fetching articles: {}", redact_api_key(&url));

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body: EverythingResponse = match response.json().await {
            Ok(body) => body,
            Err(e) if !status.is_success() => {
                debug!("Undecodable error body: {}", e);
                return Err(NewsError::Api {
                    status: status.as_u16(),
                    message: status.canonical_reason().unwrap_or("Unknown").to_string(),
                });
            }
            Err(e) => return Err(NewsError::Http(e)),
        };

        if !status.is_success() || body.status.as_deref() == Some("error") {
            let message = match (body.code, body.message) {
                (Some(code), Some(message)) => format!("{}: {}", code, message),
                (None, Some(message)) => message,
                (Some(code), None) => code,
                (None, None) => status.canonical_reason().unwrap_or("Unknown").to_string(),
            };
            return Err(NewsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        info!(
            "Fetched {} articles for {:?} in {}ms",
            body.articles.len(),
            params.query,
            start_time.elapsed().as_millis()
        );
        Ok(body.articles)
    }
}

#[async_trait]
impl NewsSource for NewsApiFetcher {
    fn source_name(&self) -> String {
        Url::parse(&self.config.base_url)
            .ok()
            .and_then(|u| u.host_str().map(|h| format!("News API ({})", h)))
            .unwrap_or_else(|| "News API".to_string())
    }

    async fn fetch(&self, params: &QueryParameters) -> Vec<Article> {
        match self.try_fetch(params).await {
            Ok(articles) => articles,
            Err(e) => {
                error!("Error fetching news for {:?}: {}", params.query, e);
                Vec::new()
            }
        }
    }
}

fn redact_api_key(url: &Url) -> String {
    let mut shown = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "apiKey" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown.to_string()
}
