use anyhow::{Result, bail};
use client::{BootstrapSettings, Route, SessionState};
use shared::config::ClientConfig;
use tracing::debug;

use crate::console;

/// Resolves the session for `route` and renders the landing view once its
/// counts have loaded. When the fallback login schedules a reload, the view is
/// rendered again afterwards.
///
/// Fails when the landing view ends up signed out, which only happens after
/// the fallback login was refused.
pub async fn run(config: &ClientConfig, route: Route) -> Result<()> {
    let context = super::context(config)?;
    let settings = BootstrapSettings::from_config(config);

    let (controller, reloads, state) = super::mount_home(&context, &settings, route).await;
    debug!(?state, "landing view mounted");
    if route.is_landing() && state == SessionState::Unauthenticated {
        bail!("fallback login failed; check FABRICATOR_USERNAME and FABRICATOR_PASSWORD");
    }
    console::render_home(state, &controller.settled_metrics().await);

    super::follow_reload(controller, reloads, &context, &settings, route).await;
    Ok(())
}
