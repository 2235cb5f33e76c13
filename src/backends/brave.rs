//! Brave Search API, an independent index.
//!
//! Brave pages by page index rather than result offset, and serves at most
//! ten pages. Offsets past that range are reported as an exhausted backend.

use serde::Deserialize;

use crate::backend::PageFetcher;
use crate::config::RetrieverConfig;
use crate::credentials::ApiKey;
use crate::error::RetrievalError;
use crate::http;
use crate::types::{RawCandidate, SearchBackend};

use super::read_body;

/// Highest page index the Brave API accepts.
const MAX_PAGE_INDEX: usize = 9;

/// Brave Search API client.
pub struct BraveBackend {
    client: reqwest::Client,
    endpoint: String,
    api_key: ApiKey,
    search_lang: String,
    safe_search: bool,
}

impl BraveBackend {
    /// Build a Brave client from `config` and an already-resolved key.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &RetrieverConfig, api_key: ApiKey) -> Result<Self, RetrievalError> {
        Ok(Self {
            client: http::build_fetch_client(config)?,
            endpoint: config.endpoint().to_owned(),
            api_key,
            search_lang: search_lang(&config.locale),
            safe_search: config.safe_search,
        })
    }
}

/// Brave wants a bare language code: `en-GB` becomes `en`.
fn search_lang(locale: &str) -> String {
    locale
        .split(|c: char| c == '-' || c == '_')
        .next()
        .unwrap_or("en")
        .to_ascii_lowercase()
}

impl PageFetcher for BraveBackend {
    async fn fetch_page(
        &self,
        query: &str,
        offset: usize,
        page_size: usize,
    ) -> Result<Vec<RawCandidate>, RetrievalError> {
        let page_index = offset / page_size.max(1);
        if page_index > MAX_PAGE_INDEX {
            tracing::debug!(page_index, "Brave page index out of range");
            return Ok(Vec::new());
        }

        tracing::trace!(query, page_index, page_size, "Brave page request");

        let safe_search = if self.safe_search { "strict" } else { "off" };

        let request = self
            .client
            .get(&self.endpoint)
            .header("X-Subscription-Token", self.api_key.expose())
            .header("Accept", "application/json")
            .query(&[
                ("q", query),
                ("search_lang", self.search_lang.as_str()),
                ("safesearch", safe_search),
            ])
            .query(&[("count", page_size), ("offset", page_index)]);

        let body = read_body(request, SearchBackend::Brave).await?;
        parse_brave_response(&body)
    }

    fn name(&self) -> &'static str {
        SearchBackend::Brave.name()
    }

    fn max_page_size(&self) -> usize {
        SearchBackend::Brave.max_page_size()
    }
}

#[derive(Debug, Deserialize)]
struct BraveResponse {
    web: Option<BraveWeb>,
}

#[derive(Debug, Deserialize)]
struct BraveWeb {
    #[serde(default)]
    results: Vec<BraveWebResult>,
}

#[derive(Debug, Deserialize)]
struct BraveWebResult {
    #[serde(default)]
    title: String,
    url: Option<String>,
    #[serde(default)]
    description: String,
}

/// Decode a Brave response body into raw candidates.
///
/// # Errors
///
/// Returns [`RetrievalError::Parse`] if the body is not valid JSON of the
/// expected shape.
pub(crate) fn parse_brave_response(body: &str) -> Result<Vec<RawCandidate>, RetrievalError> {
    let response: BraveResponse = serde_json::from_str(body)
        .map_err(|e| RetrievalError::Parse(format!("Brave response: {e}")))?;

    let candidates: Vec<RawCandidate> = response
        .web
        .map(|web| web.results)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|result| {
            let url = result.url.filter(|u| !u.trim().is_empty())?;
            Some(RawCandidate {
                title: result.title,
                url,
                snippet: result.description,
            })
        })
        .collect();

    tracing::debug!(count = candidates.len(), "Brave page parsed");
    Ok(candidates)
}
