//! Retriever configuration with sensible defaults.
//!
//! [`RetrieverConfig`] controls which backend is queried, the attempt
//! budget, timeouts, probe concurrency and the blocked-source list. It can
//! be loaded from and saved to TOML. The API key is deliberately not part
//! of it; see [`crate::credentials`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, RetrievalError};
use crate::types::SearchBackend;

/// Page requests allowed per retrieval unless configured otherwise.
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Configuration for a [`crate::Retriever`].
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrieverConfig {
    /// Which upstream search API to page through.
    pub backend: SearchBackend,
    /// Override for the backend's search endpoint.
    pub base_url: Option<String>,
    /// Results requested per page. `None` uses the query's `max_results`,
    /// capped at the backend's maximum page size.
    pub page_size: Option<usize>,
    /// Upper bound on page requests per retrieval.
    pub max_attempts: usize,
    /// Timeout for one search page request, in seconds.
    pub fetch_timeout_seconds: u64,
    /// Timeout for one liveness probe, in milliseconds.
    pub probe_timeout_ms: u64,
    /// Maximum liveness probes in flight at once. `1` probes strictly in order.
    pub probe_concurrency: usize,
    /// Host substrings that are never accepted (non-text media hosts).
    pub blocked_sources: Vec<String>,
    /// Market / language sent to the backend.
    pub locale: String,
    /// Whether to request strict safe search.
    pub safe_search: bool,
    /// Custom User-Agent string. If `None`, probes rotate through a built-in
    /// list of browser User-Agents.
    pub user_agent: Option<String>,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            backend: SearchBackend::Bing,
            base_url: None,
            page_size: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            fetch_timeout_seconds: 10,
            probe_timeout_ms: 3_000,
            probe_concurrency: 8,
            blocked_sources: vec!["youtube.com".into()],
            locale: "en-GB".into(),
            safe_search: true,
            user_agent: None,
        }
    }
}

impl RetrieverConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `max_attempts`, `fetch_timeout_seconds`, `probe_timeout_ms` and
    ///   `probe_concurrency` must be greater than 0
    /// - `page_size`, when set, must be greater than 0
    /// - `blocked_sources` entries must not be blank
    /// - `base_url`, when set, must be an absolute http(s) URL
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(RetrievalError::Config(
                "max_attempts must be greater than 0".into(),
            ));
        }
        if self.fetch_timeout_seconds == 0 {
            return Err(RetrievalError::Config(
                "fetch_timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.probe_timeout_ms == 0 {
            return Err(RetrievalError::Config(
                "probe_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.probe_concurrency == 0 {
            return Err(RetrievalError::Config(
                "probe_concurrency must be greater than 0".into(),
            ));
        }
        if self.page_size == Some(0) {
            return Err(RetrievalError::Config(
                "page_size must be greater than 0".into(),
            ));
        }
        if self.blocked_sources.iter().any(|s| s.trim().is_empty()) {
            return Err(RetrievalError::Config(
                "blocked_sources entries must not be empty".into(),
            ));
        }
        if let Some(ref base) = self.base_url {
            let parsed = url::Url::parse(base)
                .map_err(|e| RetrievalError::Config(format!("invalid base_url: {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(RetrievalError::Config(
                    "base_url must use http or https".into(),
                ));
            }
        }
        Ok(())
    }

    /// The search endpoint to call: the override if set, else the backend default.
    pub fn endpoint(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.backend.default_base_url())
    }

    /// Page size for a query asking for `max_results`, never above
    /// `backend_limit` and never below 1.
    pub fn effective_page_size(&self, max_results: usize, backend_limit: usize) -> usize {
        self.page_size
            .unwrap_or(max_results)
            .clamp(1, backend_limit.max(1))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| RetrievalError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| RetrievalError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/link-retriever/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config)
                .join("link-retriever")
                .join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("link-retriever")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/link-retriever/config.toml")
        }
    }
}
