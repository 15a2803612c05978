use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single news item as returned by the search API.
///
/// Every field is optional on the wire. Consumers normalize missing
/// values at the point of use instead of rejecting the article.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub source: Option<ArticleSource>,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub url_to_image: Option<String>,
    pub published_at: Option<String>,
    pub content: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleSource {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// Remote search parameters. `None` dates are unbounded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParameters {
    pub query: String,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl QueryParameters {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            from: None,
            to: None,
        }
    }
}

/// Opaque signed-in user as handed back by the identity provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub provider_id: String,
    pub id_token: String,
    pub refresh_token: Option<String>,
}

/// Federated providers usable with `IdentityProvider::sign_in_with_popup`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdpProvider {
    Google,
    Github,
    Facebook,
}

impl IdpProvider {
    pub fn provider_id(&self) -> &'static str {
        match self {
            IdpProvider::Google => "google.com",
            IdpProvider::Github => "github.com",
            IdpProvider::Facebook => "facebook.com",
        }
    }
}

/// Rejection from the identity provider. The message is meant to be shown
/// to the user as-is.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AuthError {
    pub message: String,
}

impl AuthError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// Contract note:
// Implementations of these traits are the collaborators the dashboard calls
// out to. The dashboard never retries and never inspects transport details,
// so a `NewsSource` degrades every failure to an empty list and an
// `IdentityProvider` folds failures into a displayable `AuthError`.

#[async_trait]
pub trait NewsSource: Send + Sync {
    fn source_name(&self) -> String;

    /// One query per call. Failures yield an empty list.
    async fn fetch(&self, params: &QueryParameters) -> Vec<Article>;
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    /// Exchange a credential obtained from a federated provider's own
    /// sign-in flow for an identity.
    async fn sign_in_with_popup(&self, provider: IdpProvider, credential: &str) -> Result<Identity, AuthError>;
}

/// Durable string key/value storage, the way a browser's local storage works.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
    fn remove(&mut self, key: &str) -> anyhow::Result<()>;
}
