//! Per-candidate filter pipeline.
//!
//! Checks run in a fixed order and stop at the first rejection:
//!
//! 1. Blocked source: the host contains a deny-list entry.
//! 2. Allow-list: when the query names domains, the normalised URL (the
//!    one callers get back) must contain one.
//! 3. De-duplication against the retrieval's [`SeenUrls`].
//!
//! Only a candidate that passes all three is recorded as seen.

use url::Url;

use crate::content::plain_text;
use crate::types::{RawCandidate, SearchResult};

use super::state::SeenUrls;

/// Outcome of screening one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Forward to the liveness prober.
    Pass,
    /// Host is on the blocked-source list.
    BlockedSource,
    /// URL matches none of the allow-list domains.
    DomainMismatch,
    /// URL was already admitted earlier in this retrieval.
    Duplicate,
}

/// A candidate that passed every filter, waiting for its probe.
#[derive(Debug, Clone)]
pub struct Survivor {
    /// The backend entry.
    pub candidate: RawCandidate,
    /// Normalised probe target, also the published URL.
    pub target: Url,
}

impl Survivor {
    /// Build the published result once the probe succeeded.
    pub fn into_result(self) -> SearchResult {
        SearchResult {
            title: plain_text(&self.candidate.title),
            url: self.target.into(),
            snippet: plain_text(&self.candidate.snippet),
        }
    }
}

/// Backend-agnostic candidate screening.
#[derive(Debug, Clone)]
pub struct CandidateFilter {
    blocked_sources: Vec<String>,
}

impl CandidateFilter {
    /// Create a filter with the given host deny-list (matched case-insensitively).
    pub fn new<I, S>(blocked_sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            blocked_sources: blocked_sources
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Whether the candidate comes from a blocked source.
    ///
    /// Matches against the host when the URL parses, otherwise against the
    /// whole raw URL.
    pub fn is_blocked(&self, raw_url: &str, target: Option<&Url>) -> bool {
        let haystack = match target.and_then(Url::host_str) {
            Some(host) => host.to_lowercase(),
            None => raw_url.to_lowercase(),
        };
        self.blocked_sources
            .iter()
            .any(|blocked| haystack.contains(blocked.as_str()))
    }

    /// Run the full pipeline for one candidate.
    ///
    /// `domains` must already be lowercased and in ASCII form (see
    /// [`crate::Query::domains`]). The allow-list is matched against the
    /// normalised URL, falling back to the raw one when it does not parse.
    /// On [`Verdict::Pass`] the URL has been added to `seen`.
    pub fn screen(
        &self,
        candidate: &RawCandidate,
        target: Option<&Url>,
        domains: &[String],
        seen: &mut SeenUrls,
    ) -> Verdict {
        if self.is_blocked(&candidate.url, target) {
            return Verdict::BlockedSource;
        }
        let published = target.map_or(candidate.url.as_str(), Url::as_str);
        if !matches_allow_list(published, domains) {
            return Verdict::DomainMismatch;
        }
        if !seen.insert(&candidate.url, target.map(Url::as_str)) {
            return Verdict::Duplicate;
        }
        Verdict::Pass
    }
}

/// Whether `url` contains at least one lowercased `domains` entry,
/// ignoring case. An empty allow-list admits everything.
pub fn matches_allow_list(url: &str, domains: &[String]) -> bool {
    if domains.is_empty() {
        return true;
    }
    let url = url.to_lowercase();
    domains.iter().any(|domain| url.contains(domain.as_str()))
}
