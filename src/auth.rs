//! Bearer tokens for the Cloud Partner Portal.

use crate::error::{CliError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// AAD resource the portal accepts tokens for.
pub const CLOUD_PARTNER_RESOURCE: &str = "https://cloudpartner.azure.com";
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

#[async_trait]
pub trait Authorizer: Send + Sync {
    /// A bearer token valid for the next request.
    async fn token(&self) -> Result<String>;
}

/// A token handed in from outside, e.g.
/// `AZURE_TOKEN=$(az account get-access-token --resource https://cloudpartner.azure.com --query accessToken -o tsv)`.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl Authorizer for StaticToken {
    async fn token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// OAuth2 client-credentials grant for a service principal. The first token
/// is kept for the rest of the process.
pub struct ClientCredentials {
    http: reqwest::Client,
    authority_host: String,
    tenant_id: String,
    client_id: String,
    client_secret: String,
    cached: Mutex<Option<String>>,
}

impl ClientCredentials {
    pub fn new(
        http: reqwest::Client,
        authority_host: &str,
        tenant_id: String,
        client_id: String,
        client_secret: String,
    ) -> Self {
        Self {
            http,
            authority_host: authority_host.trim_end_matches('/').to_string(),
            tenant_id,
            client_id,
            client_secret,
            cached: Mutex::new(None),
        }
    }

    async fn acquire(&self) -> Result<String> {
        let url = format!("{}/{}/oauth2/token", self.authority_host, self.tenant_id);
        tracing::debug!(%url, client_id = %self.client_id, "requesting access token");

        let resp = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("resource", CLOUD_PARTNER_RESOURCE),
            ])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(CliError::Authorization(format!(
                "token request to {url} failed with status {}: {body}",
                status.as_u16()
            )));
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            CliError::Authorization(format!("unexpected token response: {e}"))
        })?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl Authorizer for ClientCredentials {
    async fn token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }
        let token = self.acquire().await?;
        *cached = Some(token.clone());
        Ok(token)
    }
}

/// Pick an authorizer from the process environment.
pub fn from_env(http: reqwest::Client) -> Result<Arc<dyn Authorizer>> {
    from_lookup(http, |key| std::env::var(key).ok())
}

/// `AZURE_TOKEN` wins; otherwise a service principal from `AZURE_TENANT_ID`,
/// `AZURE_CLIENT_ID` and `AZURE_CLIENT_SECRET`.
pub fn from_lookup(
    http: reqwest::Client,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Arc<dyn Authorizer>> {
    let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

    if let Some(token) = var("AZURE_TOKEN") {
        tracing::debug!("authorizing with AZURE_TOKEN");
        return Ok(Arc::new(StaticToken::new(token)));
    }

    let required = |key: &str| {
        var(key).ok_or_else(|| {
            CliError::Authorization(format!(
                "{key} is not set. Set AZURE_TOKEN, or AZURE_TENANT_ID, AZURE_CLIENT_ID and AZURE_CLIENT_SECRET"
            ))
        })
    };
    let tenant_id = required("AZURE_TENANT_ID")?;
    let client_id = required("AZURE_CLIENT_ID")?;
    let client_secret = required("AZURE_CLIENT_SECRET")?;
    let authority = var("AZURE_AUTHORITY_HOST").unwrap_or_else(|| DEFAULT_AUTHORITY_HOST.into());

    tracing::debug!(tenant = %tenant_id, "authorizing with client credentials");
    Ok(Arc::new(ClientCredentials::new(
        http,
        &authority,
        tenant_id,
        client_id,
        client_secret,
    )))
}
