//! Error types for the link-retriever crate.
//!
//! Only configuration problems ([`RetrievalError::Config`] and
//! [`RetrievalError::MissingCredential`]) ever reach the caller of a
//! retrieval. The remaining variants describe backend and probe failures
//! that the engine logs and absorbs. No API keys appear in error messages.

/// Errors raised while configuring or running a retrieval.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    /// Invalid retriever configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The backend credential is absent from the environment.
    #[error("missing credential: set the {var} environment variable")]
    MissingCredential {
        /// Name of the environment variable that was consulted.
        var: &'static str,
    },

    /// A search page request failed, timed out, or returned a non-2xx status.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// An HTTP client could not be constructed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A search page body could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// I/O error while reading or writing a config file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RetrievalError {
    /// Returns `true` for errors that must stop the caller before any
    /// retrieval is attempted.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_) | Self::MissingCredential { .. })
    }
}

/// Convenience type alias for link-retriever results.
pub type Result<T> = std::result::Result<T, RetrievalError>;
