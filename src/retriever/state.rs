//! Mutable bookkeeping owned by a single retrieval.

use std::collections::HashSet;

use crate::types::{RejectionStats, RetrievalReport, SearchResult};

use super::filter::Verdict;

/// URLs already admitted during one retrieval.
///
/// Both the raw backend spelling and the normalised form are recorded, so
/// a later candidate matching either one is a duplicate. Entries are never
/// removed.
#[derive(Debug, Default)]
pub struct SeenUrls {
    urls: HashSet<String>,
}

impl SeenUrls {
    /// Record a URL. Returns `false` if it (or its normalised form) was
    /// already present, in which case nothing is inserted.
    pub fn insert(&mut self, raw: &str, normalized: Option<&str>) -> bool {
        if self.urls.contains(raw) || normalized.is_some_and(|n| self.urls.contains(n)) {
            return false;
        }
        self.urls.insert(raw.to_owned());
        if let Some(n) = normalized {
            self.urls.insert(n.to_owned());
        }
        true
    }

    /// Whether `url` has been recorded, in either spelling.
    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }
}

/// State for one run of the fetch / filter / probe loop.
#[derive(Debug, Default)]
pub struct RetrievalState {
    /// Result offset of the next page request.
    pub offset: usize,
    /// Page requests issued so far.
    pub attempts: usize,
    /// De-duplication set.
    pub seen: SeenUrls,
    /// Accepted results, in acceptance order.
    pub accepted: Vec<SearchResult>,
    /// Rejection counters; only ever incremented.
    pub stats: RejectionStats,
    /// Set when cancellation ended the loop.
    pub cancelled: bool,
}

impl RetrievalState {
    /// Whether `requested` results have been accepted.
    pub fn is_full(&self, requested: usize) -> bool {
        self.accepted.len() >= requested
    }

    /// How many more results are needed to reach `requested`.
    pub fn remaining(&self, requested: usize) -> usize {
        requested.saturating_sub(self.accepted.len())
    }

    /// Count a filter rejection.
    pub fn reject(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Pass => {}
            Verdict::BlockedSource => self.stats.blocked_source += 1,
            Verdict::DomainMismatch => self.stats.domain_mismatch += 1,
            Verdict::Duplicate => self.stats.duplicate += 1,
        }
    }

    /// Count a failed liveness probe.
    pub fn reject_dead_link(&mut self) {
        self.stats.dead_link += 1;
    }

    /// Append an accepted result.
    pub fn accept(&mut self, result: SearchResult) {
        self.accepted.push(result);
    }

    /// Finish the retrieval, truncating to `requested`.
    pub fn into_report(mut self, requested: usize) -> RetrievalReport {
        self.accepted.truncate(requested);
        RetrievalReport {
            results: self.accepted,
            stats: self.stats,
            attempts: self.attempts,
            cancelled: self.cancelled,
        }
    }
}
