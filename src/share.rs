//! Shareable deep links for a single, non-paginated query.
//!
//! A link is `<origin>/search/img/single/<base64(json)>`, where the JSON is
//! the search query without `limit`, `page` and `rets`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SiteError};
use crate::query::{Filters, SearchQuery, TimeWindow};

/// Route the deep link points at.
pub const SHARE_ROUTE: &str = "/search/img/single/";

/// Search query stripped of pagination and returned-field selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareQuery {
    #[serde(flatten)]
    pub filters: Filters,
    #[serde(flatten)]
    pub window: TimeWindow,
}

impl From<&SearchQuery> for ShareQuery {
    fn from(query: &SearchQuery) -> Self {
        Self {
            filters: query.filters,
            window: query.window.clone(),
        }
    }
}

impl ShareQuery {
    /// Compact JSON, base64 encoded with the standard alphabet.
    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_vec(self)?;
        Ok(STANDARD.encode(json))
    }

    /// Decode either the bare base64 segment or a complete share link.
    pub fn decode(input: &str) -> Result<Self> {
        let input = input.trim();
        let encoded = match input.find(SHARE_ROUTE) {
            Some(idx) => &input[idx + SHARE_ROUTE.len()..],
            None => input,
        };
        if encoded.is_empty() {
            return Err(SiteError::MalformedShareLink("empty query segment".to_string()));
        }

        let json = STANDARD
            .decode(encoded)
            .map_err(|e| SiteError::MalformedShareLink(format!("bad base64: {}", e)))?;
        serde_json::from_slice(&json)
            .map_err(|e| SiteError::MalformedShareLink(format!("bad query: {}", e)))
    }

    /// Replay as a first-page search with the given page size.
    pub fn into_search(self, limit: u32) -> SearchQuery {
        SearchQuery {
            filters: self.filters,
            window: self.window,
            ..SearchQuery::interactive(limit)
        }
    }
}

/// Build the deep link for `query` under `origin`.
pub fn build_share_link(origin: &str, query: &SearchQuery) -> Result<String> {
    let encoded = ShareQuery::from(query).encode()?;
    let link = format!(
        "{}{}{}",
        origin.trim_end_matches('/'),
        SHARE_ROUTE,
        encoded
    );
    debug!("Built share link: {}", link);
    Ok(link)
}
