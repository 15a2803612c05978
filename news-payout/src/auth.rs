use crate::config::IdentityConfig;
use crate::types::{AuthError, Identity, IdentityProvider, IdpProvider, NewsError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    provider_id: Option<String>,
    id_token: String,
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Identity provider backed by the Firebase Identity Toolkit REST API.
pub struct FirebaseIdentity {
    client: Client,
    config: IdentityConfig,
}

impl FirebaseIdentity {
    pub fn new(config: IdentityConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(NewsError::Config(
                "identity.api_key (or FIREBASE_API_KEY) is required to sign in".to_string(),
            ));
        }
        let client = Client::builder().build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, method: &str) -> std::result::Result<Url, AuthError> {
        let mut base = self.config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        // "./" keeps "accounts:..." from being read as a URL scheme.
        let mut url = Url::parse(&base)
            .and_then(|b| b.join(&format!("./accounts:{}", method)))
            .map_err(|e| AuthError::new(e.to_string()))?;
        url.query_pairs_mut().append_pair("key", &self.config.api_key);
        Ok(url)
    }

    async fn call(&self, method: &str, body: Value, fallback_provider: &str) -> std::result::Result<Identity, AuthError> {
        let url = self.endpoint(method)?;
        debug!("Identity request: accounts:{}", method);

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::new(e.to_string()))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| AuthError::new(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| format!("HTTP {}", status));
            warn!("Identity provider rejected accounts:{}: {}", method, message);
            return Err(AuthError::new(message));
        }

        let account: AccountResponse =
            serde_json::from_str(&text).map_err(|e| AuthError::new(e.to_string()))?;
        Ok(Identity {
            uid: account.local_id,
            email: account.email,
            display_name: account.display_name,
            provider_id: account
                .provider_id
                .unwrap_or_else(|| fallback_provider.to_string()),
            id_token: account.id_token,
            refresh_token: account.refresh_token,
        })
    }
}

/// Form-encoded credential the IdP exchange expects for `provider`.
fn idp_post_body(provider: IdpProvider, credential: &str) -> String {
    let param = match provider {
        IdpProvider::Google => "id_token",
        IdpProvider::Github | IdpProvider::Facebook => "access_token",
    };
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair(param, credential)
        .append_pair("providerId", provider.provider_id())
        .finish()
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> std::result::Result<Identity, AuthError> {
        let body = json!({ "email": email, "password": password, "returnSecureToken": true });
        self.call("signInWithPassword", body, "password").await
    }

    async fn sign_up(&self, email: &str, password: &str) -> std::result::Result<Identity, AuthError> {
        let body = json!({ "email": email, "password": password, "returnSecureToken": true });
        self.call("signUp", body, "password").await
    }

    async fn sign_in_with_popup(
        &self,
        provider: IdpProvider,
        credential: &str,
    ) -> std::result::Result<Identity, AuthError> {
        let body = json!({
            "postBody": idp_post_body(provider, credential),
            "requestUri": self.config.request_uri,
            "returnIdpCredential": true,
            "returnSecureToken": true,
        });
        self.call("signInWithIdp", body, provider.provider_id()).await
    }
}
