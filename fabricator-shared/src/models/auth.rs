use serde::{Deserialize, Serialize};
use std::fmt;

/// Access/refresh token pair issued by the backend.
///
/// The backend answers with `{access, refresh}`; the longer
/// `{access_token, refresh_token}` spelling is accepted as well.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthToken {
    /// Short-lived bearer credential sent with every authorized request.
    #[serde(alias = "access_token")]
    pub access: String,

    /// Refresh credential, kept as issued.
    #[serde(
        default,
        alias = "refresh_token",
        skip_serializing_if = "Option::is_none"
    )]
    /// Refresh token, when the backend issued one.
    pub refresh: Option<String>,
}

impl AuthToken {
    /// Creates a token pair without a refresh credential.
    pub fn new(access: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: None,
        }
    }

    /// Attaches a refresh credential.
    #[must_use]
    pub fn with_refresh(mut self, refresh: impl Into<String>) -> Self {
        self.refresh = Some(refresh.into());
        self
    }

    /// Value for the `Authorization` header under the given scheme.
    #[must_use]
    pub fn authorization(&self, scheme: &str) -> String {
        format!("{scheme} {}", self.access)
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("access", &"<redacted>")
            .field("refresh", &self.refresh.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Identifier/secret pair used to obtain a token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Username or email.
    pub identifier: String,
    /// Password.
    pub secret: String,
}

impl Credentials {
    /// Pairs an identifier with its secret.
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Body of the token obtain endpoint.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    /// Username sent to the token endpoint.
    pub username: String,
    /// Password sent to the token endpoint.
    pub password: String,
}

impl From<&Credentials> for LoginRequest {
    fn from(credentials: &Credentials) -> Self {
        Self {
            username: credentials.identifier.clone(),
            password: credentials.secret.clone(),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
