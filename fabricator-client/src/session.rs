//! Persisted session state: the token pair and the initialization marker.
//!
//! Both live under independent keys. Presence of a token is the only signal
//! of an authenticated session; nothing else is remembered across reloads.

use std::sync::Arc;

use shared::models::AuthToken;
use tracing::warn;

use crate::storage::{Storage, StorageError};

/// Storage key of the serialized token pair.
pub const TOKEN_KEY: &str = "auth_tokens";

/// Storage key of the initialization marker.
pub const MARKER_KEY: &str = "init";

const MARKER_VALUE: &str = "init";

/// Reads and writes the current token pair.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn Storage>,
}

impl TokenStore {
    /// Token store over `storage`.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Returns the stored token pair, if any.
    ///
    /// # Errors
    /// Returns an error if storage cannot be read or holds an unreadable token.
    pub fn get(&self) -> Result<Option<AuthToken>, StorageError> {
        match self.storage.get(TOKEN_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Replaces the stored token pair.
    ///
    /// # Errors
    /// Returns an error if storage cannot be written.
    pub fn set(&self, token: &AuthToken) -> Result<(), StorageError> {
        let raw = serde_json::to_string(token)?;
        self.storage.set(TOKEN_KEY, &raw)
    }

    /// Removes the stored token pair.
    ///
    /// # Errors
    /// Returns an error if storage cannot be written.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(TOKEN_KEY)
    }

    /// Whether a usable token is stored. Unreadable state counts as absent.
    #[must_use]
    pub fn has_token(&self) -> bool {
        match self.get() {
            Ok(token) => token.is_some(),
            Err(err) => {
                warn!(error = %err, "ignoring unreadable auth token");
                false
            }
        }
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore").finish_non_exhaustive()
    }
}

/// Persisted flag recording that the bootstrap run has completed.
#[derive(Clone)]
pub struct InitializationMarker {
    storage: Arc<dyn Storage>,
}

impl InitializationMarker {
    /// Marker over `storage`.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Whether the marker is present. Unreadable state counts as unset.
    #[must_use]
    pub fn is_set(&self) -> bool {
        match self.storage.get(MARKER_KEY) {
            Ok(value) => value.is_some_and(|value| !value.is_empty()),
            Err(err) => {
                warn!(error = %err, "ignoring unreadable initialization marker");
                false
            }
        }
    }

    /// Records that bootstrap has run.
    ///
    /// # Errors
    /// Returns an error if storage cannot be written.
    pub fn set(&self) -> Result<(), StorageError> {
        self.storage.set(MARKER_KEY, MARKER_VALUE)
    }

    /// Forgets that bootstrap has run.
    ///
    /// # Errors
    /// Returns an error if storage cannot be written.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(MARKER_KEY)
    }
}

impl std::fmt::Debug for InitializationMarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitializationMarker")
            .field("set", &self.is_set())
            .finish()
    }
}

/// The session capability handed to controllers.
#[derive(Debug, Clone)]
pub struct SessionStore {
    tokens: TokenStore,
    marker: InitializationMarker,
}

impl SessionStore {
    /// Token store and marker sharing `storage`.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            tokens: TokenStore::new(Arc::clone(&storage)),
            marker: InitializationMarker::new(storage),
        }
    }

    /// Token half of the store.
    #[must_use]
    pub const fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Marker half of the store.
    #[must_use]
    pub const fn marker(&self) -> &InitializationMarker {
        &self.marker
    }
}
