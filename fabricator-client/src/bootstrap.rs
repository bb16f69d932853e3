//! Landing view controller: fallback login, bootstrap prompt and record counts.
//!
//! State is resolved from persisted storage once per mount. Logging in and
//! initializing never move the controller forward in memory beyond what
//! storage already says; they schedule a reload and the host mounts a fresh
//! controller that re-derives everything.
//!
//! Counts load in a background task owned by the controller. Mounting does
//! not wait for them, and the task is aborted on teardown or drop.

use std::{
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use shared::{
    config::ClientConfig,
    models::{Credentials, InitialRequest},
};
use thiserror::Error;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, instrument, warn};

use crate::{
    context::ClientContext,
    error::AuthError,
    gateway::AuthGateway,
    guard::InFlight,
    metrics::MetricsBoard,
    reload::{ReloadReason, ReloadTimer},
    routes::Route,
};

/// Session states of the landing view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No token and no automatic login on this view.
    Unauthenticated,
    /// No token yet; the fallback login is running.
    AutoLoggingIn,
    /// Signed in, bootstrap has not run.
    AuthenticatedPreInit,
    /// Signed in and bootstrapped.
    AuthenticatedPostInit,
}

/// What the landing view shows for a session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeView {
    /// Fallback login in progress.
    Loading,
    /// No session and no automatic login on this view.
    LoginRequired,
    /// Records table plus the initialize action.
    InitializePrompt,
    /// Records table plus the link to the shop.
    Shop,
}

impl SessionState {
    /// Whether a token is stored.
    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        matches!(
            self,
            Self::AuthenticatedPreInit | Self::AuthenticatedPostInit
        )
    }

    /// Maps the state onto what the landing view renders.
    #[must_use]
    pub const fn view(self) -> HomeView {
        match self {
            Self::Unauthenticated => HomeView::LoginRequired,
            Self::AutoLoggingIn => HomeView::Loading,
            Self::AuthenticatedPreInit => HomeView::InitializePrompt,
            Self::AuthenticatedPostInit => HomeView::Shop,
        }
    }
}

/// Derives the session state from persisted facts and the current view.
#[must_use]
pub const fn resolve_session_state(
    has_token: bool,
    initialized: bool,
    route: Route,
) -> SessionState {
    match (has_token, initialized) {
        (false, _) if route.is_landing() => SessionState::AutoLoggingIn,
        (false, _) => SessionState::Unauthenticated,
        (true, false) => SessionState::AuthenticatedPreInit,
        (true, true) => SessionState::AuthenticatedPostInit,
    }
}

/// Fallback account and reload delay.
#[derive(Debug, Clone)]
pub struct BootstrapSettings {
    /// Account used when the landing view has no token.
    pub fallback: Credentials,
    /// Wait between a successful login or initialize and the reload.
    pub reload_delay: Duration,
}

impl BootstrapSettings {
    /// Reads both settings from the client configuration.
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            fallback: config.fallback_credentials(),
            reload_delay: config.reload_delay(),
        }
    }
}

/// Why the initialize action did not complete.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The session is not in `AuthenticatedPreInit`.
    #[error("initialization is not available while {0:?}")]
    NotAvailable(SessionState),
    /// A previous request has not returned yet.
    #[error("an initialization request is already in flight")]
    InFlight,
    /// The backend or the store refused.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Controller behind the landing view.
pub struct SessionBootstrapController {
    context: ClientContext,
    gateway: AuthGateway,
    settings: BootstrapSettings,
    timer: ReloadTimer,
    state: watch::Sender<SessionState>,
    metrics: Arc<watch::Sender<MetricsBoard>>,
    metrics_task: Mutex<Option<JoinHandle<()>>>,
    mounted: AtomicBool,
    initialize_in_flight: AtomicBool,
}

impl SessionBootstrapController {
    /// Creates an unmounted controller. Reload signals go out through `timer`.
    #[must_use]
    pub fn new(context: ClientContext, settings: BootstrapSettings, timer: ReloadTimer) -> Self {
        let gateway = context.gateway();
        Self {
            context,
            gateway,
            settings,
            timer,
            state: watch::Sender::new(SessionState::Unauthenticated),
            metrics: Arc::new(watch::Sender::new(MetricsBoard::default())),
            metrics_task: Mutex::new(None),
            mounted: AtomicBool::new(false),
            initialize_in_flight: AtomicBool::new(false),
        }
    }

    /// Current session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Receiver that observes every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Snapshot of the counts. Entries still loading are pending.
    #[must_use]
    pub fn metrics(&self) -> MetricsBoard {
        self.metrics.borrow().clone()
    }

    /// Receiver that observes each count as it lands.
    #[must_use]
    pub fn subscribe_metrics(&self) -> watch::Receiver<MetricsBoard> {
        self.metrics.subscribe()
    }

    /// Waits for the running count fetch, if any, and returns the board.
    pub async fn settled_metrics(&self) -> MetricsBoard {
        let running = self
            .metrics_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|task| !task.is_finished());
        let mut updates = self.metrics.subscribe();
        if running && let Ok(board) = updates.wait_for(MetricsBoard::is_settled).await {
            return board.clone();
        }
        self.metrics()
    }

    /// Whether a reload is scheduled and has not fired yet.
    #[must_use]
    pub fn reload_pending(&self) -> bool {
        self.timer.is_pending()
    }

    /// Resolves the session for `route`, logs in with the fallback account
    /// when needed and starts loading the counts for authenticated views.
    /// Returns without waiting for the counts.
    ///
    /// Only the first call per controller does any work; later calls return
    /// the current state.
    #[instrument(skip(self), fields(route = %route))]
    pub async fn mount(&self, route: Route) -> SessionState {
        if self.mounted.swap(true, Ordering::AcqRel) {
            debug!("controller already mounted");
            return self.state();
        }

        let mut state = self.resolve(route);
        info!(?state, "session resolved");

        if state == SessionState::AutoLoggingIn {
            state = self.auto_login(route).await;
        }
        if state.is_authenticated() {
            self.refresh_metrics();
        }
        state
    }

    /// Seeds the demonstration data. Only available before bootstrap has run.
    ///
    /// # Errors
    /// `NotAvailable` outside `AuthenticatedPreInit`, `InFlight` while a
    /// previous call is outstanding, `Auth` when the request fails. Only
    /// `Auth` failures are notified.
    #[instrument(skip(self))]
    pub async fn handle_initial(&self) -> Result<(), BootstrapError> {
        let state = self.state();
        if state != SessionState::AuthenticatedPreInit {
            return Err(BootstrapError::NotAvailable(state));
        }
        let Some(_in_flight) = InFlight::acquire(&self.initialize_in_flight) else {
            return Err(BootstrapError::InFlight);
        };

        match self.run_initial().await {
            Ok(()) => {
                info!("bootstrap data initialized");
                self.timer
                    .schedule(ReloadReason::Initialized, self.settings.reload_delay);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "initialization failed");
                self.context.notifier.error(&err.notification());
                Err(err.into())
            }
        }
    }

    /// Refetches the six counts in the background, replacing any fetch still
    /// running. Each count starts out pending. Needs a Tokio runtime.
    pub fn refresh_metrics(&self) {
        self.metrics.send_replace(MetricsBoard::default());
        let token = self.context.store.tokens().get().ok().flatten();
        let backend = Arc::clone(&self.context.backend);
        let board = Arc::clone(&self.metrics);
        let task = tokio::spawn(async move {
            MetricsBoard::fetch_into(&backend, token.as_ref(), &board).await;
        });
        if let Some(previous) = self.replace_metrics_task(Some(task)) {
            previous.abort();
        }
    }

    /// Cancels a reload that has not fired yet and stops loading counts.
    /// Returns whether a reload was pending.
    pub fn teardown(&self) -> bool {
        if let Some(task) = self.replace_metrics_task(None) {
            task.abort();
        }
        self.timer.cancel()
    }

    fn replace_metrics_task(&self, task: Option<JoinHandle<()>>) -> Option<JoinHandle<()>> {
        let mut slot = self
            .metrics_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *slot, task)
    }

    fn resolve(&self, route: Route) -> SessionState {
        let store = &self.context.store;
        let state = resolve_session_state(store.tokens().has_token(), store.marker().is_set(), route);
        self.state.send_replace(state);
        state
    }

    async fn auto_login(&self, route: Route) -> SessionState {
        match self.gateway.login(&self.settings.fallback).await {
            Ok(_) => {
                info!("fallback login succeeded");
                self.timer
                    .schedule(ReloadReason::LoggedIn, self.settings.reload_delay);
                self.resolve(route)
            }
            Err(err) => {
                warn!(error = %err, "fallback login failed");
                self.context.notifier.error(&err.notification());
                self.state.send_replace(SessionState::Unauthenticated);
                SessionState::Unauthenticated
            }
        }
    }

    async fn run_initial(&self) -> Result<(), AuthError> {
        let store = &self.context.store;
        let token = store.tokens().get()?.ok_or(AuthError::Unauthenticated)?;
        self.context
            .backend
            .initialize(&token, &InitialRequest::default())
            .await?;
        store.marker().set()?;
        Ok(())
    }
}

impl std::fmt::Debug for SessionBootstrapController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionBootstrapController")
            .field("state", &self.state())
            .field("mounted", &self.mounted.load(Ordering::Acquire))
            .field("reload_pending", &self.reload_pending())
            .finish_non_exhaustive()
    }
}

impl Drop for SessionBootstrapController {
    fn drop(&mut self) {
        if let Some(task) = self.replace_metrics_task(None) {
            task.abort();
        }
    }
}
