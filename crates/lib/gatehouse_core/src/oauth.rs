//! OAuth code exchange for external login providers.
//!
//! The orchestrator only sees the normalized [`ExternalIdentity`]; provider
//! secrets and HTTP details stay behind [`OAuthExchange`].

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::auth::AuthError;
use crate::models::user::ExternalIdentity;
use crate::providers::{PROVIDER_GITHUB, PROVIDER_YANDEX};

/// Turns a provider callback `code` into a normalized identity.
#[async_trait]
pub trait OAuthExchange: Send + Sync {
    async fn exchange(&self, provider: &str, code: &str) -> Result<ExternalIdentity, AuthError>;
}

/// Client credentials for one provider.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    pub client_id: String,
    pub client_secret: String,
}

/// Endpoints of an authorization-code provider.
#[derive(Debug, Clone)]
struct Endpoints {
    token_url: &'static str,
    user_url: &'static str,
    /// Authorization scheme for the user-info call (`Bearer` or `OAuth`).
    auth_scheme: &'static str,
}

const GITHUB: Endpoints = Endpoints {
    token_url: "https://github.com/login/oauth/access_token",
    user_url: "https://api.github.com/user",
    auth_scheme: "Bearer",
};

const YANDEX: Endpoints = Endpoints {
    token_url: "https://oauth.yandex.ru/token",
    user_url: "https://login.yandex.ru/info?format=json",
    auth_scheme: "OAuth",
};

fn endpoints(provider: &str) -> Option<&'static Endpoints> {
    match provider {
        PROVIDER_GITHUB => Some(&GITHUB),
        PROVIDER_YANDEX => Some(&YANDEX),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// [`OAuthExchange`] over HTTP for GitHub and Yandex.
#[derive(Debug, Clone, Default)]
pub struct HttpOAuthExchange {
    http: reqwest::Client,
    clients: HashMap<String, OAuthClient>,
}

impl HttpOAuthExchange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register credentials for a supported provider.
    pub fn with_client(mut self, provider: &str, client: OAuthClient) -> Self {
        self.clients.insert(provider.to_string(), client);
        self
    }

    /// Providers with credentials configured.
    pub fn configured(&self) -> Vec<&str> {
        self.clients.keys().map(String::as_str).collect()
    }

    async fn access_token(
        &self,
        endpoints: &Endpoints,
        client: &OAuthClient,
        code: &str,
    ) -> Result<String, AuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", client.client_id.as_str()),
            ("client_secret", client.client_secret.as_str()),
        ];
        let resp = self
            .http
            .post(endpoints.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(format!("token exchange failed: {e}")))?;
        if resp.status().is_server_error() {
            return Err(AuthError::Unavailable(format!(
                "token exchange HTTP {}",
                resp.status()
            )));
        }
        if !resp.status().is_success() {
            return Err(AuthError::InvalidCredential);
        }
        let body = resp
            .json::<TokenResponse>()
            .await
            .map_err(|e| AuthError::Internal(format!("token response parse error: {e}")))?;
        match body.access_token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => {
                debug!(
                    error = body.error.as_deref().unwrap_or("none"),
                    description = body.error_description.as_deref().unwrap_or(""),
                    "provider rejected authorization code"
                );
                Err(AuthError::InvalidCredential)
            }
        }
    }

    async fn user_info(&self, endpoints: &Endpoints, access_token: &str) -> Result<Value, AuthError> {
        let resp = self
            .http
            .get(endpoints.user_url)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("{} {access_token}", endpoints.auth_scheme),
            )
            .header(reqwest::header::USER_AGENT, "gatehouse")
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(format!("user info request failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(AuthError::Unavailable(format!(
                "user info HTTP {}",
                resp.status()
            )));
        }
        resp.json::<Value>()
            .await
            .map_err(|e| AuthError::Internal(format!("user info parse error: {e}")))
    }
}

#[async_trait]
impl OAuthExchange for HttpOAuthExchange {
    async fn exchange(&self, provider: &str, code: &str) -> Result<ExternalIdentity, AuthError> {
        let endpoints = endpoints(provider).ok_or_else(|| {
            AuthError::ValidationError(format!("unsupported OAuth provider: {provider}"))
        })?;
        let client = self.clients.get(provider).ok_or_else(|| {
            AuthError::ValidationError(format!("OAuth provider {provider} is not configured"))
        })?;
        let token = self.access_token(endpoints, client, code).await?;
        let info = self.user_info(endpoints, &token).await?;
        identity_from_profile(provider, &info)
    }
}

/// Normalize a provider profile document.
pub fn identity_from_profile(provider: &str, info: &Value) -> Result<ExternalIdentity, AuthError> {
    let (id, email, name) = match provider {
        PROVIDER_GITHUB => (
            scalar(info.get("id")),
            text(info.get("email")),
            text(info.get("name")).or_else(|| text(info.get("login"))),
        ),
        PROVIDER_YANDEX => (
            scalar(info.get("id")),
            text(info.get("default_email")),
            text(info.get("real_name")).or_else(|| text(info.get("display_name"))),
        ),
        other => {
            return Err(AuthError::ValidationError(format!(
                "unsupported OAuth provider: {other}"
            )));
        }
    };
    let external_id =
        id.ok_or_else(|| AuthError::Internal(format!("{provider} profile without id")))?;
    let email = email.ok_or_else(|| {
        AuthError::ValidationError(format!("{provider} account has no public email"))
    })?;
    Ok(ExternalIdentity {
        provider: provider.to_string(),
        external_id,
        email,
        display_name: name,
    })
}

/// String or number field as a string.
fn scalar(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text(v: Option<&Value>) -> Option<String> {
    v.and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
