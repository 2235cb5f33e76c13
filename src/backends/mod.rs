//! Search backend implementations.
//!
//! Each module provides a struct implementing [`crate::backend::PageFetcher`]
//! for one JSON search API. [`AnyBackend`] picks one from configuration.

pub mod bing;
pub mod brave;

pub use bing::BingBackend;
pub use brave::BraveBackend;

use crate::backend::PageFetcher;
use crate::config::RetrieverConfig;
use crate::credentials::ApiKey;
use crate::error::RetrievalError;
use crate::types::{RawCandidate, SearchBackend};

/// The configured backend, dispatched statically.
pub enum AnyBackend {
    /// Bing Web Search.
    Bing(BingBackend),
    /// Brave Search.
    Brave(BraveBackend),
}

impl AnyBackend {
    /// Build the backend named by `config.backend`.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &RetrieverConfig, api_key: ApiKey) -> Result<Self, RetrievalError> {
        match config.backend {
            SearchBackend::Bing => Ok(Self::Bing(BingBackend::new(config, api_key)?)),
            SearchBackend::Brave => Ok(Self::Brave(BraveBackend::new(config, api_key)?)),
        }
    }
}

impl PageFetcher for AnyBackend {
    async fn fetch_page(
        &self,
        query: &str,
        offset: usize,
        page_size: usize,
    ) -> Result<Vec<RawCandidate>, RetrievalError> {
        match self {
            Self::Bing(backend) => backend.fetch_page(query, offset, page_size).await,
            Self::Brave(backend) => backend.fetch_page(query, offset, page_size).await,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Bing(backend) => backend.name(),
            Self::Brave(backend) => backend.name(),
        }
    }

    fn max_page_size(&self) -> usize {
        match self {
            Self::Bing(backend) => backend.max_page_size(),
            Self::Brave(backend) => backend.max_page_size(),
        }
    }
}

/// Send a page request and return the body of a 2xx response.
async fn read_body(
    request: reqwest::RequestBuilder,
    backend: SearchBackend,
) -> Result<String, RetrievalError> {
    let response = request
        .send()
        .await
        .map_err(|e| RetrievalError::BackendUnavailable(format!("{backend} request failed: {e}")))?
        .error_for_status()
        .map_err(|e| RetrievalError::BackendUnavailable(format!("{backend} HTTP error: {e}")))?;

    let body = response.text().await.map_err(|e| {
        RetrievalError::BackendUnavailable(format!("{backend} response read failed: {e}"))
    })?;

    tracing::trace!(bytes = body.len(), %backend, "page response received");
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_selects_backend() {
        let key = ApiKey::new("k").expect("key");
        let bing = AnyBackend::from_config(&RetrieverConfig::default(), key.clone()).expect("bing");
        assert_eq!(bing.name(), "Bing");
        assert_eq!(bing.max_page_size(), 50);

        let config = RetrieverConfig {
            backend: SearchBackend::Brave,
            ..Default::default()
        };
        let brave = AnyBackend::from_config(&config, key).expect("brave");
        assert_eq!(brave.name(), "Brave");
        assert_eq!(brave.max_page_size(), 20);
    }
}
