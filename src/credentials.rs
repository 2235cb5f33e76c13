//! Backend API credentials.
//!
//! The surrounding process resolves the key once, usually with
//! [`ApiKey::from_env`], and hands it to [`crate::Retriever::new`]. The
//! engine itself never reads the environment, so tests can inject a fake
//! key without touching process state.

use std::fmt;

use crate::error::{Result, RetrievalError};
use crate::types::SearchBackend;

/// A backend API key. Its `Debug` output never shows the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key, rejecting blank values.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::Config`] if `key` is empty or whitespace.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return Err(RetrievalError::Config("API key must not be empty".into()));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Read the key for `backend` from its environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::MissingCredential`] if the variable is unset
    /// or blank.
    pub fn from_env(backend: SearchBackend) -> Result<Self> {
        Self::from_lookup(backend, |var| std::env::var(var).ok())
    }

    /// Resolve the key for `backend` through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::MissingCredential`] if the lookup yields
    /// nothing usable.
    pub fn from_lookup<F>(backend: SearchBackend, lookup: F) -> Result<Self>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        let var = backend.credential_var();
        lookup(var)
            .and_then(|value| Self::new(value).ok())
            .ok_or(RetrievalError::MissingCredential { var })
    }

    /// The raw secret, for building request headers.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}
