//! Core types: queries, raw candidates, accepted results and backend identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lowercased, ASCII-compatible form of one allow-list entry.
///
/// Only the part before the first `/` is treated as a host; an entry whose
/// host part does not parse is kept as typed.
fn allow_list_entry(raw: &str) -> String {
    let entry = raw.trim().to_lowercase();
    if entry.is_ascii() {
        return entry;
    }
    let (host, rest) = match entry.split_once('/') {
        Some((host, path)) => (host, Some(path)),
        None => (entry.as_str(), None),
    };
    match url::Host::parse(host) {
        Ok(host) => match rest {
            Some(path) => format!("{host}/{path}"),
            None => host.to_string(),
        },
        Err(_) => entry,
    }
}

/// An immutable retrieval request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
    domains: Vec<String>,
    max_results: usize,
}

impl Query {
    /// Create a query with no domain restriction.
    pub fn new(text: impl Into<String>, max_results: usize) -> Self {
        Self {
            text: text.into(),
            domains: Vec::new(),
            max_results,
        }
    }

    /// Restrict results to URLs containing at least one of `domains`.
    ///
    /// Entries are trimmed and lowercased, and internationalised domains are
    /// converted to punycode so they match normalised result URLs. Blanks
    /// and repeats are dropped while the first-seen order is kept.
    pub fn with_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for domain in domains {
            let domain = allow_list_entry(domain.as_ref());
            if !domain.is_empty() && !self.domains.contains(&domain) {
                self.domains.push(domain);
            }
        }
        self
    }

    /// The free-text search string.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Lowercased allow-list entries. Empty means no restriction.
    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// Requested number of results.
    pub fn max_results(&self) -> usize {
        self.max_results
    }
}

/// One entry from a backend page, before any filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCandidate {
    /// Title as returned by the backend (may contain markup).
    pub title: String,
    /// URL exactly as returned; may be relative or malformed.
    pub url: String,
    /// Snippet as returned by the backend (may contain markup).
    pub snippet: String,
}

impl RawCandidate {
    /// Convenience constructor.
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
        }
    }
}

/// An accepted, live search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Plain-text page title.
    pub title: String,
    /// Normalised, scheme-qualified URL.
    pub url: String,
    /// Plain-text snippet summarising the page.
    pub snippet: String,
}

/// Supported upstream search APIs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchBackend {
    /// Bing Web Search API v7.
    #[default]
    Bing,
    /// Brave Search API.
    Brave,
}

impl SearchBackend {
    /// Returns the human-readable name of this backend.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bing => "Bing",
            Self::Brave => "Brave",
        }
    }

    /// Environment variable holding this backend's API key.
    pub fn credential_var(&self) -> &'static str {
        match self {
            Self::Bing => "BING_API_KEY",
            Self::Brave => "BRAVE_API_KEY",
        }
    }

    /// Default search endpoint.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Bing => "https://api.bing.microsoft.com/v7.0/search",
            Self::Brave => "https://api.search.brave.com/res/v1/web/search",
        }
    }

    /// Largest `count` the API accepts per page.
    pub fn max_page_size(&self) -> usize {
        match self {
            Self::Bing => 50,
            Self::Brave => 20,
        }
    }

    /// Returns all available backend variants.
    pub fn all() -> &'static [SearchBackend] {
        &[Self::Bing, Self::Brave]
    }
}

impl fmt::Display for SearchBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SearchBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bing" => Ok(Self::Bing),
            "brave" => Ok(Self::Brave),
            other => Err(format!("unknown backend '{other}' (expected bing or brave)")),
        }
    }
}

/// Why candidates were turned away during one retrieval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RejectionStats {
    /// Host matched the blocked-source deny-list.
    pub blocked_source: usize,
    /// URL matched none of the query's allow-list domains.
    pub domain_mismatch: usize,
    /// URL was already seen earlier in the same retrieval.
    pub duplicate: usize,
    /// Liveness probe failed, timed out, or the URL was not probeable.
    pub dead_link: usize,
}

impl RejectionStats {
    /// Blocked-source and allow-list rejections combined, as reported in logs.
    pub fn domain_filtered(&self) -> usize {
        self.blocked_source + self.domain_mismatch
    }
}

/// Everything one retrieval produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RetrievalReport {
    /// Accepted results in acceptance order.
    pub results: Vec<SearchResult>,
    /// Rejection counters.
    pub stats: RejectionStats,
    /// Number of page requests issued.
    pub attempts: usize,
    /// Whether the retrieval was cut short by cancellation.
    pub cancelled: bool,
}
