//! Dependency bundle handed to every controller.

use std::sync::Arc;

use shared::config::ClientConfig;

use crate::{
    api::{Backend, FabricatorClient},
    gateway::AuthGateway,
    notify::NotificationSink,
    session::SessionStore,
    storage::{FileStorage, Storage},
};

/// Collaborators shared by the controllers.
#[derive(Clone)]
pub struct ClientContext {
    /// HTTP access to the backend.
    pub backend: Arc<dyn Backend>,
    /// Persisted token and marker.
    pub store: SessionStore,
    /// Where user-facing messages go.
    pub notifier: Arc<dyn NotificationSink>,
}

impl ClientContext {
    /// Bundles the three collaborators.
    pub fn new(
        backend: Arc<dyn Backend>,
        storage: Arc<dyn Storage>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            backend,
            store: SessionStore::new(storage),
            notifier,
        }
    }

    /// HTTP backend and file-backed session state as configured.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(
        config: &ClientConfig,
        notifier: Arc<dyn NotificationSink>,
    ) -> Result<Self, reqwest::Error> {
        let backend = Arc::new(FabricatorClient::new(config)?);
        let storage = Arc::new(FileStorage::new(&config.state_path));
        Ok(Self::new(backend, storage, notifier))
    }

    /// Gateway over this context's backend and token store.
    #[must_use]
    pub fn gateway(&self) -> AuthGateway {
        AuthGateway::new(Arc::clone(&self.backend), self.store.tokens().clone())
    }
}

impl std::fmt::Debug for ClientContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientContext")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
