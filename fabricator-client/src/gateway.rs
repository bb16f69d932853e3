//! Login, profile and deletion calls that keep the token store current.

use std::sync::Arc;

use shared::models::{AuthToken, Credentials, DeleteAccountRequest, LoginRequest, UserProfile};
use tracing::{info, instrument};

use crate::{api::Backend, error::AuthError, session::TokenStore, validation};

/// Credential login, profile lookup and account deletion on top of a
/// [`Backend`], keeping the [`TokenStore`] in step with successful logins.
#[derive(Clone)]
pub struct AuthGateway {
    backend: Arc<dyn Backend>,
    tokens: TokenStore,
}

impl AuthGateway {
    /// Wraps `backend`, storing issued tokens in `tokens`.
    pub fn new(backend: Arc<dyn Backend>, tokens: TokenStore) -> Self {
        Self { backend, tokens }
    }

    /// Logs in and persists the issued token pair.
    ///
    /// # Errors
    /// `InvalidCredentials`, `NetworkFailure` or `ServerError` from the backend,
    /// or `Storage` if the token cannot be persisted.
    #[instrument(skip_all, fields(identifier = %credentials.identifier))]
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthToken, AuthError> {
        let token = self
            .backend
            .obtain_token(&LoginRequest::from(credentials))
            .await?;
        self.tokens.set(&token)?;
        info!("token stored");
        Ok(token)
    }

    /// Profile of the signed-in account. Reads only; never mutates state.
    ///
    /// # Errors
    /// `Unauthenticated` without a stored token, otherwise backend failures.
    pub async fn current_account(&self) -> Result<UserProfile, AuthError> {
        let token = self.stored_token()?;
        self.backend.current_account(&token).await
    }

    /// Deletes the signed-in account. Does not touch the stored token.
    ///
    /// # Errors
    /// `Validation` before any network call for malformed input,
    /// `Unauthenticated` without a stored token, `InvalidCredentials` when the
    /// server rejects the password, otherwise backend failures.
    #[instrument(skip_all, fields(email = %request.email))]
    pub async fn delete_account(&self, request: &DeleteAccountRequest) -> Result<(), AuthError> {
        validation::validate_request(request).map_err(AuthError::Validation)?;
        let token = self.stored_token()?;
        self.backend.delete_account(&token, request).await?;
        info!("account deleted");
        Ok(())
    }

    fn stored_token(&self) -> Result<AuthToken, AuthError> {
        self.tokens.get()?.ok_or(AuthError::Unauthenticated)
    }
}

impl std::fmt::Debug for AuthGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGateway")
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}
