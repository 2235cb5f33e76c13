//! Retrieval engine: paginated fetch, filter pipeline, liveness probes.
//!
//! Pages are requested one at a time from a [`crate::backend::PageFetcher`],
//! screened by [`filter::CandidateFilter`], probed by
//! [`probe::LivenessProber`], and accepted in page order until the query's
//! target is met or the attempt budget runs out.

pub mod engine;
pub mod filter;
pub mod probe;
pub mod state;
pub mod url_normalize;

pub use engine::Retriever;
