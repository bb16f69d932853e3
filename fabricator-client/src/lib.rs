//! Client-side orchestration for the Fabricator shop: fallback login and
//! token caching, the one-time bootstrap action and password-confirmed
//! account deletion.
//!
//! Controllers receive their collaborators through a [`ClientContext`]:
//! a [`Backend`], a [`SessionStore`] over pluggable [`Storage`] and a
//! [`NotificationSink`]. The [`FabricatorClient`] HTTP backend and
//! [`FileStorage`] are the production implementations.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod bootstrap;
pub mod context;
pub mod deletion;
pub mod error;
pub mod gateway;
mod guard;
pub mod metrics;
pub mod notify;
pub mod reload;
pub mod routes;
pub mod session;
pub mod storage;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use api::{Backend, FabricatorClient};
pub use bootstrap::{
    BootstrapError, BootstrapSettings, HomeView, SessionBootstrapController, SessionState,
    resolve_session_state,
};
pub use context::ClientContext;
pub use deletion::{AccountDeletionController, DeletionError, DeletionState, DeletionView};
pub use error::AuthError;
pub use gateway::AuthGateway;
pub use metrics::{CountRow, CountStatus, MetricsBoard};
pub use notify::{Notification, NotificationSink, TracingNotifier};
pub use reload::{ReloadReason, ReloadReceiver, ReloadSignal, ReloadTimer};
pub use routes::Route;
pub use session::{InitializationMarker, SessionStore, TokenStore};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use validation::{DeletionForm, FieldErrors, ValidationError};
