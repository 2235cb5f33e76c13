//! HTTP clients for backend page requests and liveness probes.
//!
//! Page requests talk to a JSON API and identify the crate honestly.
//! Probes hit arbitrary sites, so they carry a browser-like User-Agent
//! (rotated unless one is configured) to avoid trivial bot rejections.

use std::time::Duration;

use rand::seq::SliceRandom;

use crate::config::RetrieverConfig;
use crate::error::RetrievalError;

/// Realistic browser User-Agent strings, rotated per prober.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Redirect hops a probe follows before the link counts as dead.
const MAX_PROBE_REDIRECTS: usize = 10;

/// Build the client used for backend page requests.
///
/// # Errors
///
/// Returns [`RetrievalError::Http`] if the client cannot be constructed.
pub fn build_fetch_client(config: &RetrieverConfig) -> Result<reqwest::Client, RetrievalError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.fetch_timeout_seconds))
        .user_agent(concat!("link-retriever/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| RetrievalError::Http(format!("failed to build fetch client: {e}")))
}

/// Build the client used for HEAD liveness probes.
///
/// The client has:
/// - Timeout of `probe_timeout_ms`
/// - Redirects followed up to a fixed hop limit (loops surface as errors)
/// - Random User-Agent from the rotation list (or custom if configured)
///
/// # Errors
///
/// Returns [`RetrievalError::Http`] if the client cannot be constructed.
pub fn build_probe_client(config: &RetrieverConfig) -> Result<reqwest::Client, RetrievalError> {
    let ua = match config.user_agent {
        Some(ref custom) => custom.clone(),
        None => random_user_agent().to_owned(),
    };

    reqwest::Client::builder()
        .timeout(Duration::from_millis(config.probe_timeout_ms))
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::limited(MAX_PROBE_REDIRECTS))
        .build()
        .map_err(|e| RetrievalError::Http(format!("failed to build probe client: {e}")))
}

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        // USER_AGENTS is a non-empty const array, choose only returns None on empty slices
        .unwrap_or(USER_AGENTS[0])
}
