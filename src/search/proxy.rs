//! Proxy Activation
//!
//! Search traffic never leaves from our own address: before every search the
//! ScraperAPI account is checked and a `reqwest::Client` routed through the
//! ScraperAPI proxy port is built. Any failure here is a configuration error
//! and stops the request before a query is issued.

use async_trait::async_trait;
use reqwest::{Client, Proxy};
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::SearchConfig;
use crate::types::{AppError, AppResult};

/// Username prefix understood by the ScraperAPI proxy port.
const SCRAPERAPI_PROXY_USER: &str = "scraperapi.retry_404=true";

#[async_trait]
pub trait ProxyActivator: Send + Sync {
    /// Returns an HTTP client whose traffic goes through the proxy.
    async fn activate(&self) -> AppResult<Client>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountStatus {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    request_count: Option<u64>,
    #[serde(default)]
    request_limit: Option<u64>,
}

pub struct ScraperApiProxy {
    api_key: String,
    account_url: String,
    proxy_host: String,
    http: Client,
}

impl ScraperApiProxy {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_config(&SearchConfig {
            scraperapi_key: api_key.into(),
            ..SearchConfig::default()
        })
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            api_key: config.scraperapi_key.clone(),
            account_url: config.scraperapi_account_url.clone(),
            proxy_host: config.scraperapi_proxy_host.clone(),
            http: Client::new(),
        }
    }

    fn proxy_url(&self) -> String {
        format!("http://{}", self.proxy_host)
    }

    async fn check_account(&self) -> AppResult<()> {
        let response = self
            .http
            .get(&self.account_url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| AppError::Configuration(format!("ScraperAPI account check failed: {}", e)))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let account: Option<AccountStatus> = serde_json::from_str(&body).ok();

        if let Some(error) = account.as_ref().and_then(|a| a.error.clone()) {
            return Err(AppError::Configuration(format!("ScraperAPI rejected the key: {}", error)));
        }

        if !status.is_success() {
            return Err(AppError::Configuration(format!(
                "ScraperAPI account check returned {}: {}",
                status, body
            )));
        }

        let account = account.ok_or_else(|| {
            AppError::Configuration("ScraperAPI account response was not valid JSON".to_string())
        })?;

        if let (Some(count), Some(limit)) = (account.request_count, account.request_limit) {
            if count >= limit {
                return Err(AppError::Configuration(format!(
                    "ScraperAPI request limit reached ({}/{})",
                    count, limit
                )));
            }
            info!(request_count = count, request_limit = limit, "ScraperAPI account active");
        }

        Ok(())
    }
}

#[async_trait]
impl ProxyActivator for ScraperApiProxy {
    async fn activate(&self) -> AppResult<Client> {
        if self.api_key.is_empty() {
            warn!("SCRAPERAPI_KEY is not set");
            return Err(AppError::Configuration("ScraperAPI key not configured".to_string()));
        }

        self.check_account().await?;

        let proxy = Proxy::all(self.proxy_url())
            .map_err(|e| AppError::Configuration(format!("Invalid proxy address: {}", e)))?
            .basic_auth(SCRAPERAPI_PROXY_USER, &self.api_key);

        // The proxy port re-signs TLS traffic with its own certificate
        Client::builder()
            .proxy(proxy)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build proxied client: {}", e)))
    }
}
