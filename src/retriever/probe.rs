//! HEAD-request liveness probes.
//!
//! A link is alive when a HEAD request, after following redirects, ends in
//! a status below 400 within the probe timeout. Timeouts, connection and
//! TLS failures, and redirect loops all count as dead. Probes are never
//! retried.

use url::Url;

use crate::config::RetrieverConfig;
use crate::error::RetrievalError;
use crate::http;

/// Issues liveness probes with a shared client.
#[derive(Debug, Clone)]
pub struct LivenessProber {
    client: reqwest::Client,
}

impl LivenessProber {
    /// Build a prober using the config's probe timeout and User-Agent.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::Http`] if the client cannot be built.
    pub fn new(config: &RetrieverConfig) -> Result<Self, RetrievalError> {
        Ok(Self {
            client: http::build_probe_client(config)?,
        })
    }

    /// Probe one target. Never fails: every error is a dead link.
    pub async fn is_alive(&self, url: &Url) -> bool {
        match self.client.head(url.as_str()).send().await {
            Ok(response) => {
                let status = response.status();
                let alive = status.as_u16() < 400;
                if !alive {
                    tracing::trace!(url = %url, %status, "dead link");
                }
                alive
            }
            Err(err) => {
                tracing::trace!(
                    url = %url,
                    error = %err,
                    timeout = err.is_timeout(),
                    "probe failed"
                );
                false
            }
        }
    }
}
