//! REST implementation of [`KnowledgeBackend`].
//!
//! `RestKnowledgeClient` wraps a `reqwest::Client` and translates the
//! trait methods into HTTP calls against the knowledge server. 4xx
//! responses are permanent errors; transport failures and 5xx map to
//! `Error::Knowledge` and surface to the search tool as a failure string.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};

use cf_domain::config::KnowledgeConfig;
use cf_domain::error::{Error, Result};

use crate::backend::KnowledgeBackend;
use crate::types::{KnowledgeHit, KnowledgeSearchRequest, SearchResponseBody};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A REST-based client for the knowledge server.
///
/// Created once and reused for the lifetime of the gateway process; the
/// underlying `reqwest::Client` maintains a connection pool.
#[derive(Debug, Clone)]
pub struct RestKnowledgeClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl RestKnowledgeClient {
    /// Build a new client from the shared [`KnowledgeConfig`].
    pub fn new(cfg: &KnowledgeConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
            api_key: cfg.api_key.clone(),
        })
    }

    /// Build the full URL for a path like `/api/search`.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Decorate a request with the standard headers.
    fn decorate(&self, rb: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => rb.header("X-Api-Key", key),
            None => rb,
        }
    }
}

#[async_trait]
impl KnowledgeBackend for RestKnowledgeClient {
    async fn is_available(&self) -> bool {
        let rb = self.decorate(self.http.get(self.url("/health")));
        match rb.send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "knowledge health probe failed");
                false
            }
        }
    }

    async fn search(&self, req: KnowledgeSearchRequest) -> Result<Vec<KnowledgeHit>> {
        let rb = self.decorate(self.http.post(self.url("/api/search")).json(&req));
        let resp = rb
            .send()
            .await
            .map_err(|e| Error::Knowledge(format!("search request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Knowledge(format!(
                "search returned {status}: {body}"
            )));
        }

        let body: SearchResponseBody = resp
            .json()
            .await
            .map_err(|e| Error::Knowledge(format!("malformed search response: {e}")))?;
        Ok(body.results)
    }
}
