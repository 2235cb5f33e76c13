//! Trait definition for pluggable search backends.
//!
//! Each upstream API implements [`PageFetcher`] to hand the engine one page
//! of [`RawCandidate`] values per call. Filtering and liveness probing are
//! backend-agnostic and live in [`crate::retriever`].

use std::future::Future;

use crate::error::RetrievalError;
use crate::types::RawCandidate;

/// A paginated search backend.
///
/// Implementors handle their own:
///
/// - Endpoint and query parameter construction
/// - Authentication headers
/// - Mapping of the provider's offset semantics onto a result offset
/// - JSON decoding into [`RawCandidate`]
///
/// All implementations must be `Send + Sync` so a retriever can be shared
/// across tasks.
pub trait PageFetcher: Send + Sync {
    /// Fetch one page of candidates.
    ///
    /// # Arguments
    ///
    /// * `query`: Free-text search string (unencoded).
    /// * `offset`: Number of results to skip.
    /// * `page_size`: Number of results requested.
    ///
    /// An empty `Vec` means the backend has nothing more to offer.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::BackendUnavailable`] for transport failures
    /// and non-2xx statuses, [`RetrievalError::Parse`] for malformed bodies.
    fn fetch_page(
        &self,
        query: &str,
        offset: usize,
        page_size: usize,
    ) -> impl Future<Output = Result<Vec<RawCandidate>, RetrievalError>> + Send;

    /// Human-readable backend name for logs.
    fn name(&self) -> &'static str;

    /// Largest page the backend serves.
    fn max_page_size(&self) -> usize {
        50
    }
}
