use anyhow::{Result, bail};
use client::{BootstrapError, BootstrapSettings, Route, SessionState};
use colored::Colorize;
use shared::config::ClientConfig;

/// Runs the bootstrap action from the landing view and shows the result
/// once the reload has re-derived the session.
pub async fn run(config: &ClientConfig) -> Result<()> {
    let context = super::context(config)?;
    let settings = BootstrapSettings::from_config(config);

    let (controller, reloads, state) =
        super::mount_home(&context, &settings, Route::Home).await;
    match state {
        SessionState::AuthenticatedPostInit => {
            println!("{}", "Already initialized.".green());
            return Ok(());
        }
        SessionState::Unauthenticated | SessionState::AutoLoggingIn => {
            bail!("not signed in; check the fallback credentials and run `fabricator home`");
        }
        SessionState::AuthenticatedPreInit => {}
    }

    match controller.handle_initial().await {
        Ok(()) => {}
        // Already shown by the notifier.
        Err(BootstrapError::Auth(_)) => bail!("initialization failed"),
        Err(err) => return Err(err.into()),
    }

    let state =
        super::follow_reload(controller, reloads, &context, &settings, Route::Home).await;
    if state != SessionState::AuthenticatedPostInit {
        bail!("initialization did not take effect (session is {state:?})");
    }
    Ok(())
}
