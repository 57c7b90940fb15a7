//! Persisted token storage.
//!
//! The backend issues an access/refresh token pair on login. Presence of a
//! stored pair is the sole signal used to attempt a silent session restore
//! at startup. The store is an explicit, injectable interface so tests can
//! run against an in-memory fake instead of real persistent storage.
//!
//! The token store has no internal locking: the session service is the
//! single writer by convention, serialized by the client's cooperative
//! scheduling.

mod file;

pub use file::FileCredentialStore;

use std::sync::Mutex;

use secrecy::SecretString;
use thiserror::Error;

/// Errors that can occur reading or writing stored credentials.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The token file could not be read or written.
    #[error("credential storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The token file exists but could not be parsed.
    #[error("credential storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// No usable storage location exists on this platform.
    #[error("no data directory available for credential storage")]
    NoStorageDir,
}

/// An access/refresh token pair issued by the backend.
///
/// Tokens are held as [`SecretString`] so they are redacted from `Debug`
/// output and zeroized on drop.
#[derive(Clone)]
pub struct TokenPair {
    /// Bearer token attached to authenticated calls.
    pub access: SecretString,
    /// Token sent to the backend on logout to invalidate the session.
    pub refresh: SecretString,
}

impl TokenPair {
    /// Create a pair from the raw token strings.
    #[must_use]
    pub fn new(access: &str, refresh: &str) -> Self {
        Self {
            access: SecretString::from(access.to_owned()),
            refresh: SecretString::from(refresh.to_owned()),
        }
    }
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"[REDACTED]")
            .field("refresh", &"[REDACTED]")
            .finish()
    }
}

/// Durable storage for the token pair.
///
/// Implementations must treat `store` followed by `load` as a round-trip
/// and `clear` as idempotent.
pub trait CredentialStore: Send + Sync {
    /// Load the stored pair, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be read.
    fn load(&self) -> Result<Option<TokenPair>, CredentialError>;

    /// Persist a pair, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be written.
    fn store(&self, pair: &TokenPair) -> Result<(), CredentialError>;

    /// Remove any stored pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be modified.
    fn clear(&self) -> Result<(), CredentialError>;
}

/// In-memory credential store for tests and embedders that want no
/// persistence.
#[derive(Default)]
pub struct MemoryCredentialStore {
    tokens: Mutex<Option<TokenPair>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with a pair.
    #[must_use]
    pub fn with_tokens(access: &str, refresh: &str) -> Self {
        Self {
            tokens: Mutex::new(Some(TokenPair::new(access, refresh))),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<TokenPair>, CredentialError> {
        Ok(self
            .tokens
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone())
    }

    fn store(&self, pair: &TokenPair) -> Result<(), CredentialError> {
        *self
            .tokens
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(pair.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        *self
            .tokens
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryCredentialStore::new();
        assert!(store.load().unwrap().is_none());

        store.store(&TokenPair::new("access-1", "refresh-1")).unwrap();
        let pair = store.load().unwrap().unwrap();
        assert_eq!(pair.access.expose_secret(), "access-1");
        assert_eq!(pair.refresh.expose_secret(), "refresh-1");

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let store = MemoryCredentialStore::new();
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_token_pair_debug_redacts() {
        let pair = TokenPair::new("super-secret-access", "super-secret-refresh");
        let debug = format!("{pair:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret-access"));
    }
}
