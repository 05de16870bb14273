//! HTTP client for the image search API and the shared nav fragment.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::config::Settings;
use crate::error::{Result, SiteError};
use crate::models::ImageRecord;
use crate::query::SearchQuery;

const USER_AGENT: &str = concat!("goes-browse/", env!("CARGO_PKG_VERSION"));

/// Multi-record search endpoint.
pub const SEARCH_PATH: &str = "search/img/multi";
/// Shared navigation fragment.
pub const NAV_PATH: &str = "nav.html";

/// Anything that can answer a search query with image records.
#[async_trait]
pub trait ImageSearch: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<ImageRecord>>;
}

/// Resolve user agent from config value.
/// - None => default goes-browse user agent
/// - other => custom user agent string
pub fn resolve_user_agent(config: Option<&str>) -> String {
    match config {
        None | Some("") => USER_AGENT.to_string(),
        Some(custom) => custom.to_string(),
    }
}

/// Client for a single site, rooted at its base URL.
#[derive(Debug, Clone)]
pub struct SearchClient {
    client: Client,
    base_url: Url,
}

impl SearchClient {
    /// Create a new client with the default user agent.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Self::with_user_agent(base_url, timeout, None)
    }

    /// Create a new client with custom user agent configuration.
    pub fn with_user_agent(
        base_url: &str,
        timeout: Duration,
        user_agent_config: Option<&str>,
    ) -> Result<Self> {
        let user_agent = resolve_user_agent(user_agent_config);
        let client = Client::builder()
            .user_agent(&user_agent)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;

        // Keep a trailing slash so relative joins stay under any path prefix.
        let mut base = base_url.trim_end_matches('/').to_string();
        base.push('/');

        Ok(Self {
            client,
            base_url: Url::parse(&base)?,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::with_user_agent(
            &settings.base_url,
            Duration::from_secs(settings.request_timeout),
            Some(&settings.user_agent),
        )
    }

    /// Base URL without the trailing slash, for building deep links.
    pub fn origin(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Fetch the navigation fragment as raw HTML.
    pub async fn nav_fragment(&self) -> Result<String> {
        let url = self.endpoint(NAV_PATH)?;
        debug!("GET {}", url);

        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SiteError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.text().await?)
    }
}

#[async_trait]
impl ImageSearch for SearchClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<ImageRecord>> {
        let url = self.endpoint(SEARCH_PATH)?;
        debug!("POST {} page={} limit={}", url, query.page, query.limit);

        let start = Instant::now();
        let resp = self
            .client
            .post(url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(query)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SiteError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.bytes().await?;
        let records = parse_records(&body)?;
        info!(
            "Search returned {} records in {}ms",
            records.len(),
            start.elapsed().as_millis()
        );
        Ok(records)
    }
}

/// Parse a search response body. Anything other than an array of
/// `{path, datetime}` objects is rejected.
pub fn parse_records(body: &[u8]) -> Result<Vec<ImageRecord>> {
    serde_json::from_slice(body).map_err(|e| {
        let preview: String = String::from_utf8_lossy(body).chars().take(120).collect();
        SiteError::MalformedResponse(format!("{} (body: {})", e, preview))
    })
}
