pub mod account;
pub mod completion;
pub mod config;
pub mod home;
pub mod initialize;

use std::sync::Arc;

use anyhow::{Context, Result};
use client::{
    BootstrapSettings, ClientContext, ReloadReceiver, ReloadTimer, Route,
    SessionBootstrapController, SessionState,
};
use shared::config::ClientConfig;

use crate::console::{self, ConsoleNotifier};

/// HTTP backend and file-backed state with console notifications.
pub fn context(config: &ClientConfig) -> Result<ClientContext> {
    ClientContext::from_config(config, Arc::new(ConsoleNotifier))
        .context("failed to build HTTP client")
}

/// A freshly mounted landing controller and the receiver of its reloads.
pub async fn mount_home(
    context: &ClientContext,
    settings: &BootstrapSettings,
    route: Route,
) -> (SessionBootstrapController, ReloadReceiver, SessionState) {
    let (timer, reloads) = ReloadTimer::new();
    let controller = SessionBootstrapController::new(context.clone(), settings.clone(), timer);
    let state = controller.mount(route).await;
    (controller, reloads, state)
}

/// Waits for a pending reload, then mounts and renders a fresh controller.
pub async fn follow_reload(
    controller: SessionBootstrapController,
    mut reloads: ReloadReceiver,
    context: &ClientContext,
    settings: &BootstrapSettings,
    route: Route,
) -> SessionState {
    if !controller.reload_pending() {
        return controller.state();
    }
    let Some(signal) = reloads.recv().await else {
        return controller.state();
    };
    console::render_reload(signal);
    drop(controller);

    let (fresh, _reloads, state) = mount_home(context, settings, route).await;
    console::render_home(state, &fresh.settled_metrics().await);
    state
}
