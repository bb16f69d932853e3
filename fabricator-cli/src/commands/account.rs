use anyhow::{Context, Result, bail};
use client::{AccountDeletionController, AuthError, DeletionError, DeletionForm, DeletionState};
use colored::Colorize;
use rpassword::prompt_password;
use shared::config::ClientConfig;

use crate::console;

pub async fn me(config: &ClientConfig) -> Result<()> {
    let controller = AccountDeletionController::new(super::context(config)?);
    let state = controller.enter().await;
    console::render_account(&state);
    if state == DeletionState::Unauthenticated {
        bail!("no active session; run `fabricator home` first");
    }
    Ok(())
}

pub async fn delete(config: &ClientConfig, email: String) -> Result<()> {
    let controller = AccountDeletionController::new(super::context(config)?);
    let state = controller.enter().await;
    console::render_account(&state);
    if state == DeletionState::Unauthenticated {
        bail!("no active session; run `fabricator home` first");
    }

    let password = prompt_password("Current password: ").context("failed to read password")?;
    match controller.submit(DeletionForm::new(email, password)).await {
        Ok(()) => {}
        Err(DeletionError::Auth(AuthError::Validation(errors))) => {
            console::render_field_errors(&errors);
            bail!("please correct the fields above");
        }
        Err(DeletionError::Auth(_)) => bail!("account deletion failed"),
        Err(err) => return Err(err.into()),
    }

    console::render_account(&controller.state());
    Ok(())
}

pub fn logout(config: &ClientConfig) -> Result<()> {
    let context = super::context(config)?;
    let tokens = context.store.tokens();
    if !tokens.has_token() {
        println!("No stored token at {}", config.state_path.display());
        return Ok(());
    }
    tokens
        .clear()
        .with_context(|| format!("failed to update {}", config.state_path.display()))?;
    println!("{}", "Signed out.".green());
    Ok(())
}
