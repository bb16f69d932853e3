//! HTTP access to the Fabricator backend.
//!
//! [`Backend`] is the seam the controllers depend on; [`FabricatorClient`]
//! implements it with `reqwest`, attaching the stored token under the
//! configured auth scheme and mapping non-success responses to
//! [`AuthError`].

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{
    config::ClientConfig,
    models::{
        AuthToken, CountMetric, DeleteAccountRequest, InitialRequest, LoginRequest, UserProfile,
    },
};
use tracing::{debug, instrument};
use url::Url;

use crate::error::AuthError;

const TOKEN_PATH: &str = "auth/jwt/create/";
const ACCOUNT_PATH: &str = "auth/users/me/";
const INITIAL_PATH: &str = "api/initial/";

/// Calls the controllers need from the backend.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Exchange credentials for a token pair.
    async fn obtain_token(&self, request: &LoginRequest) -> Result<AuthToken, AuthError>;

    /// Fetch the profile of the account owning `token`.
    async fn current_account(&self, token: &AuthToken) -> Result<UserProfile, AuthError>;

    /// Delete the account owning `token` after the server re-checks the password.
    async fn delete_account(
        &self,
        token: &AuthToken,
        request: &DeleteAccountRequest,
    ) -> Result<(), AuthError>;

    /// Seed (and reset) the generated demonstration data.
    async fn initialize(&self, token: &AuthToken, request: &InitialRequest)
    -> Result<(), AuthError>;

    /// Read one of the six record counts.
    async fn count(&self, token: Option<&AuthToken>, metric: CountMetric)
    -> Result<u64, AuthError>;
}

/// HTTP backend client.
#[derive(Clone, Debug)]
pub struct FabricatorClient {
    base_url: Url,
    client: Client,
    auth_scheme: String,
}

impl FabricatorClient {
    /// Create a new API client from the client configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent("fabricator-cli")
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            base_url: config.api_base_url.clone(),
            client,
            auth_scheme: config.auth_scheme.clone(),
        })
    }

    /// Root every request path is joined onto.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn api_url(&self, path: &str) -> Result<Url, AuthError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| AuthError::NetworkFailure(format!("invalid endpoint {path}: {err}")))
    }

    fn authorize(&self, request: RequestBuilder, token: &AuthToken) -> RequestBuilder {
        request.header(
            reqwest::header::AUTHORIZATION,
            token.authorization(&self.auth_scheme),
        )
    }

    async fn send(&self, request: RequestBuilder, login: bool) -> Result<Response, AuthError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "backend rejected request");
        Err(AuthError::from_response(status, &body, login))
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, AuthError> {
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|err| AuthError::ServerError {
            status,
            detail: Some(format!("unexpected response body: {err}")),
        })
    }
}

#[async_trait]
impl Backend for FabricatorClient {
    #[instrument(skip_all, fields(username = %request.username))]
    async fn obtain_token(&self, request: &LoginRequest) -> Result<AuthToken, AuthError> {
        let url = self.api_url(TOKEN_PATH)?;
        let response = self.send(self.client.post(url).json(request), true).await?;
        Self::read_json(response).await
    }

    #[instrument(skip_all)]
    async fn current_account(&self, token: &AuthToken) -> Result<UserProfile, AuthError> {
        let url = self.api_url(ACCOUNT_PATH)?;
        let response = self
            .send(self.authorize(self.client.get(url), token), false)
            .await?;
        Self::read_json(response).await
    }

    #[instrument(skip_all, fields(email = %request.email))]
    async fn delete_account(
        &self,
        token: &AuthToken,
        request: &DeleteAccountRequest,
    ) -> Result<(), AuthError> {
        let url = self.api_url(ACCOUNT_PATH)?;
        self.send(
            self.authorize(self.client.delete(url), token).json(request),
            false,
        )
        .await?;
        Ok(())
    }

    #[instrument(skip_all, fields(action = %request.name))]
    async fn initialize(
        &self,
        token: &AuthToken,
        request: &InitialRequest,
    ) -> Result<(), AuthError> {
        let url = self.api_url(INITIAL_PATH)?;
        self.send(
            self.authorize(self.client.post(url), token).json(request),
            false,
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self, token), fields(metric = %metric.label()))]
    async fn count(
        &self,
        token: Option<&AuthToken>,
        metric: CountMetric,
    ) -> Result<u64, AuthError> {
        let url = self.api_url(&metric.path())?;
        let mut request = self.client.get(url);
        if let Some(token) = token {
            request = self.authorize(request, token);
        }
        let response = self.send(request, false).await?;
        let status = response.status().as_u16();
        let body: Value = Self::read_json(response).await?;
        metric
            .parse_count(&body)
            .ok_or_else(|| AuthError::ServerError {
                status,
                detail: Some(format!(
                    "missing {} in count response",
                    metric.entity.count_field()
                )),
            })
    }
}
