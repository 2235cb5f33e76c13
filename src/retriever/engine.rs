//! The fetch → filter → probe loop.
//!
//! ```text
//! ┌──────────┐  page   ┌────────────────┐  target met / budget spent
//! │ FETCHING ├────────►│ FILTERING_PAGE ├──────────────────────────┐
//! └───▲──┬───┘         └───────┬────────┘                          ▼
//!     │  │ error / empty page  │ page exhausted             ┌──────┐
//!     │  └─────────────────────┼───────────────────────────►│ DONE │
//!     └────────────────────────┘                            └──────┘
//! ```
//!
//! Backend failures end the loop quietly: a short result list is a normal
//! outcome, not an error.

use std::ops::ControlFlow;

use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::backend::PageFetcher;
use crate::backends::AnyBackend;
use crate::config::RetrieverConfig;
use crate::credentials::ApiKey;
use crate::error::Result;
use crate::types::{Query, RawCandidate, RetrievalReport, SearchResult};

use super::filter::{CandidateFilter, Survivor, Verdict};
use super::probe::LivenessProber;
use super::state::RetrievalState;
use super::url_normalize::normalize_url;

/// A configured retrieval engine.
///
/// Construction validates the configuration (and, through
/// [`Retriever::from_env`], resolves the credential), so a `Retriever`
/// that exists can always run. Each call to [`Retriever::retrieve`] owns
/// its own state; one retriever may serve concurrent queries.
pub struct Retriever<F = AnyBackend> {
    fetcher: F,
    prober: LivenessProber,
    filter: CandidateFilter,
    config: RetrieverConfig,
}

impl Retriever<AnyBackend> {
    /// Build a retriever for `config.backend` with an injected key.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RetrievalError::Config`] for invalid configuration
    /// and [`crate::RetrievalError::Http`] if a client cannot be built.
    pub fn new(config: RetrieverConfig, api_key: ApiKey) -> Result<Self> {
        config.validate()?;
        let fetcher = AnyBackend::from_config(&config, api_key)?;
        Self::with_fetcher(config, fetcher)
    }

    /// Build a retriever, reading the backend key from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RetrievalError::MissingCredential`] before any
    /// network activity if the key is absent.
    pub fn from_env(config: RetrieverConfig) -> Result<Self> {
        Self::from_lookup(config, |var| std::env::var(var).ok())
    }

    /// Build a retriever, resolving the backend key through `lookup`.
    ///
    /// # Errors
    ///
    /// Same as [`Retriever::from_env`].
    pub fn from_lookup<L>(config: RetrieverConfig, lookup: L) -> Result<Self>
    where
        L: FnOnce(&str) -> Option<String>,
    {
        let api_key = ApiKey::from_lookup(config.backend, lookup)?;
        Self::new(config, api_key)
    }
}

impl<F: PageFetcher> Retriever<F> {
    /// Build a retriever around any [`PageFetcher`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::RetrievalError::Config`] for invalid configuration.
    pub fn with_fetcher(config: RetrieverConfig, fetcher: F) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            prober: LivenessProber::new(&config)?,
            filter: CandidateFilter::new(&config.blocked_sources),
            fetcher,
            config,
        })
    }

    /// The configuration this retriever was built with.
    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    /// Retrieve up to `query.max_results()` live results.
    pub async fn retrieve(&self, query: &Query) -> Vec<SearchResult> {
        self.retrieve_report(query, &CancellationToken::new())
            .await
            .results
    }

    /// Retrieve with rejection statistics, stopping early if `cancel` fires.
    ///
    /// Cancellation aborts any in-flight page request or probe batch and
    /// returns the results accepted so far.
    pub async fn retrieve_report(
        &self,
        query: &Query,
        cancel: &CancellationToken,
    ) -> RetrievalReport {
        let requested = query.max_results();
        let mut state = RetrievalState::default();
        if requested == 0 {
            return state.into_report(requested);
        }

        let backend = self.fetcher.name();
        let page_size = self
            .config
            .effective_page_size(requested, self.fetcher.max_page_size());
        tracing::trace!(
            query = query.text(),
            requested,
            page_size,
            backend,
            "retrieval started"
        );

        while !state.is_full(requested) && state.attempts < self.config.max_attempts {
            if cancel.is_cancelled() {
                state.cancelled = true;
                break;
            }

            // FETCHING
            state.attempts += 1;
            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    state.cancelled = true;
                    break;
                }
                outcome = self.fetcher.fetch_page(query.text(), state.offset, page_size) => outcome,
            };

            let page = match outcome {
                Ok(page) => page,
                Err(err) => {
                    tracing::warn!(
                        backend,
                        offset = state.offset,
                        error = %err,
                        "search page failed, keeping partial results"
                    );
                    break;
                }
            };
            if page.is_empty() {
                tracing::debug!(backend, offset = state.offset, "backend returned an empty page");
                break;
            }
            tracing::debug!(backend, offset = state.offset, count = page.len(), "page fetched");

            // FILTERING_PAGE
            let survivors = self.screen_page(page, query, &mut state);
            if self
                .probe_survivors(survivors, requested, &mut state, cancel)
                .await
                .is_break()
            {
                state.cancelled = true;
                break;
            }

            state.offset += page_size;
        }

        tracing::info!(
            backend,
            dead_links = state.stats.dead_link,
            domain_filtered = state.stats.domain_filtered(),
            duplicates = state.stats.duplicate,
            attempts = state.attempts,
            cancelled = state.cancelled,
            returned = state.accepted.len().min(requested),
            "retrieval finished"
        );
        state.into_report(requested)
    }

    /// Run every candidate of a page through the filters. The seen set is
    /// complete for this page before any probe starts. A passing candidate
    /// without a network URL is a dead link and never reaches the prober.
    fn screen_page(
        &self,
        page: Vec<RawCandidate>,
        query: &Query,
        state: &mut RetrievalState,
    ) -> Vec<Survivor> {
        let mut survivors = Vec::with_capacity(page.len());
        for candidate in page {
            let target = normalize_url(&candidate.url);
            match self
                .filter
                .screen(&candidate, target.as_ref(), query.domains(), &mut state.seen)
            {
                Verdict::Pass => match target {
                    Some(target) => survivors.push(Survivor { candidate, target }),
                    None => {
                        tracing::trace!(url = %candidate.url, "non-network URL counted as dead");
                        state.reject_dead_link();
                    }
                },
                rejection => state.reject(rejection),
            }
        }
        survivors
    }

    /// Probe survivors in page order, in batches no larger than the number of
    /// results still needed, so nothing is probed once the target is met.
    ///
    /// Verdicts are taken in page order as soon as each one resolves. On
    /// cancellation the results already taken stay accepted.
    async fn probe_survivors(
        &self,
        survivors: Vec<Survivor>,
        requested: usize,
        state: &mut RetrievalState,
        cancel: &CancellationToken,
    ) -> ControlFlow<()> {
        let mut pending = survivors.into_iter();
        loop {
            let batch_size = state
                .remaining(requested)
                .min(self.config.probe_concurrency);
            let batch: Vec<Survivor> = pending.by_ref().take(batch_size).collect();
            if batch.is_empty() {
                return ControlFlow::Continue(());
            }

            let mut verdicts = stream::iter(batch)
                .map(|survivor| async move {
                    let alive = self.prober.is_alive(&survivor.target).await;
                    (survivor, alive)
                })
                .buffered(batch_size);

            loop {
                let next = tokio::select! {
                    biased;
                    () = cancel.cancelled() => return ControlFlow::Break(()),
                    next = verdicts.next() => next,
                };
                let Some((survivor, alive)) = next else {
                    break;
                };
                if alive {
                    state.accept(survivor.into_result());
                } else {
                    state.reject_dead_link();
                }
            }
        }
    }
}
