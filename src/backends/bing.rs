//! Bing Web Search API v7.
//!
//! Pages are addressed by result offset (`offset`, `count`). Text fields are
//! requested as HTML so highlighting survives; the engine reduces them to
//! plain text before building results.

use serde::Deserialize;

use crate::backend::PageFetcher;
use crate::config::RetrieverConfig;
use crate::credentials::ApiKey;
use crate::error::RetrievalError;
use crate::http;
use crate::types::{RawCandidate, SearchBackend};

use super::read_body;

/// Bing Web Search API client.
pub struct BingBackend {
    client: reqwest::Client,
    endpoint: String,
    api_key: ApiKey,
    locale: String,
    safe_search: bool,
}

impl BingBackend {
    /// Build a Bing client from `config` and an already-resolved key.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &RetrieverConfig, api_key: ApiKey) -> Result<Self, RetrievalError> {
        Ok(Self {
            client: http::build_fetch_client(config)?,
            endpoint: config.endpoint().to_owned(),
            api_key,
            locale: config.locale.clone(),
            safe_search: config.safe_search,
        })
    }
}

impl PageFetcher for BingBackend {
    async fn fetch_page(
        &self,
        query: &str,
        offset: usize,
        page_size: usize,
    ) -> Result<Vec<RawCandidate>, RetrievalError> {
        tracing::trace!(query, offset, page_size, "Bing page request");

        let safe_search = if self.safe_search { "Strict" } else { "Off" };

        let request = self
            .client
            .get(&self.endpoint)
            .header("Ocp-Apim-Subscription-Key", self.api_key.expose())
            .header("Accept", "application/json")
            .query(&[
                ("q", query),
                ("responseFilter", "Webpages"),
                ("setLang", self.locale.as_str()),
                ("textDecorations", "false"),
                ("textFormat", "HTML"),
                ("safeSearch", safe_search),
            ])
            .query(&[("count", page_size), ("offset", offset)]);

        let body = read_body(request, SearchBackend::Bing).await?;
        parse_bing_response(&body)
    }

    fn name(&self) -> &'static str {
        SearchBackend::Bing.name()
    }

    fn max_page_size(&self) -> usize {
        SearchBackend::Bing.max_page_size()
    }
}

#[derive(Debug, Deserialize)]
struct BingResponse {
    #[serde(rename = "webPages")]
    web_pages: Option<BingWebPages>,
}

#[derive(Debug, Deserialize)]
struct BingWebPages {
    #[serde(default)]
    value: Vec<BingWebPage>,
}

#[derive(Debug, Deserialize)]
struct BingWebPage {
    #[serde(default)]
    name: String,
    url: Option<String>,
    #[serde(default)]
    snippet: String,
}

/// Decode a Bing response body into raw candidates.
///
/// A body without a `webPages` section (Bing's answer when nothing matched)
/// is an empty page. Entries without a URL are skipped.
///
/// # Errors
///
/// Returns [`RetrievalError::Parse`] if the body is not a JSON object of the
/// expected shape.
pub(crate) fn parse_bing_response(body: &str) -> Result<Vec<RawCandidate>, RetrievalError> {
    let response: BingResponse = serde_json::from_str(body)
        .map_err(|e| RetrievalError::Parse(format!("Bing response: {e}")))?;

    let candidates: Vec<RawCandidate> = response
        .web_pages
        .map(|pages| pages.value)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|page| {
            let url = page.url.filter(|u| !u.trim().is_empty())?;
            Some(RawCandidate {
                title: page.name,
                url,
                snippet: page.snippet,
            })
        })
        .collect();

    tracing::debug!(count = candidates.len(), "Bing page parsed");
    Ok(candidates)
}
