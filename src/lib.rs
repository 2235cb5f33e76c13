//! # link-retriever
//!
//! Live, de-duplicated, domain-filtered web search results from a paginated
//! search API.
//!
//! ## Design
//!
//! - Pages through one upstream API (Bing Web Search or Brave Search) with an
//!   advancing offset and a fixed attempt budget
//! - Screens each candidate: blocked sources, optional domain allow-list,
//!   de-duplication
//! - Confirms each surviving link with a HEAD probe under a short timeout
//! - Graceful degradation: backend failures and dead links shrink the result
//!   list instead of failing the call
//!
//! ## Security
//!
//! - The API key is injected by the caller and never logged or shown in errors
//! - Search queries are logged only at trace level
//! - Titles and snippets are reduced to plain text before returning

pub mod backend;
pub mod backends;
pub mod config;
pub mod content;
pub mod credentials;
pub mod error;
pub mod http;
pub mod retriever;
pub mod types;

pub use backend::PageFetcher;
pub use config::RetrieverConfig;
pub use credentials::ApiKey;
pub use error::{Result, RetrievalError};
pub use retriever::Retriever;
pub use types::{
    Query, RawCandidate, RejectionStats, RetrievalReport, SearchBackend, SearchResult,
};

/// Retrieve live results for `query` using the key from the environment.
///
/// Convenience wrapper that builds a [`Retriever`] with
/// [`Retriever::from_env`] and runs one retrieval. The returned list may be
/// shorter than `query.max_results()`.
///
/// # Errors
///
/// Returns [`RetrievalError::MissingCredential`] if the backend key is not
/// set, or [`RetrievalError::Config`] if `config` is invalid. No request is
/// made in either case.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> link_retriever::Result<()> {
/// let config = link_retriever::RetrieverConfig::default();
/// let query = link_retriever::Query::new("rust ownership", 5).with_domains(["rust-lang.org"]);
/// for result in link_retriever::retrieve(&query, config).await? {
///     println!("{}: {}", result.title, result.url);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn retrieve(query: &Query, config: RetrieverConfig) -> Result<Vec<SearchResult>> {
    let retriever = Retriever::from_env(config)?;
    Ok(retriever.retrieve(query).await)
}
