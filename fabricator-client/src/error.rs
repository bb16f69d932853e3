//! Error type shared by the session, bootstrap and deletion flows.

use reqwest::StatusCode;
use shared::models::ErrorResponse;
use thiserror::Error;

use crate::{storage::StorageError, validation::FieldErrors};

/// Failures of session, bootstrap and account operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Local, pre-network field validation failed.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
    /// No token is stored, or the backend no longer accepts it.
    #[error("not authenticated")]
    Unauthenticated,
    /// The backend rejected the supplied secret or authority.
    #[error("invalid credentials")]
    InvalidCredentials {
        /// Backend explanation.
        detail: Option<String>,
    },
    /// The request never produced an HTTP response.
    #[error("network failure: {0}")]
    NetworkFailure(String),
    /// Unexpected status or response body.
    #[error("server error ({status})")]
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Backend explanation.
        detail: Option<String>,
    },
    /// Session state could not be persisted locally.
    #[error("session storage failure: {0}")]
    Storage(String),
}

impl AuthError {
    /// Maps a non-success response. `login` treats 401 as a rejected secret
    /// rather than a missing session.
    #[must_use]
    pub fn from_response(status: StatusCode, body: &str, login: bool) -> Self {
        let detail = ErrorResponse::parse(body).detail;
        match status {
            StatusCode::UNAUTHORIZED if login => Self::InvalidCredentials { detail },
            StatusCode::UNAUTHORIZED => Self::Unauthenticated,
            StatusCode::BAD_REQUEST | StatusCode::FORBIDDEN => Self::InvalidCredentials { detail },
            _ => Self::ServerError {
                status: status.as_u16(),
                detail,
            },
        }
    }

    /// Human-readable summary used in notifications.
    #[must_use]
    pub const fn summary(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Please correct the highlighted fields",
            Self::Unauthenticated => "You are not signed in",
            Self::InvalidCredentials { .. } => "Request was rejected",
            Self::NetworkFailure(_) => "Unable to connect to server",
            Self::ServerError { .. } => "Request failed",
            Self::Storage(_) => "Unable to save session state",
        }
    }

    /// Server-supplied (or transport-supplied) explanation, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::InvalidCredentials { detail } | Self::ServerError { detail, .. } => {
                detail.as_deref()
            }
            Self::NetworkFailure(cause) | Self::Storage(cause) => Some(cause.as_str()),
            Self::Validation(_) | Self::Unauthenticated => None,
        }
    }

    /// Whether this failure is shown as a notification. Validation failures
    /// are rendered inline instead.
    #[must_use]
    pub const fn is_notifiable(&self) -> bool {
        !matches!(self, Self::Validation(_))
    }

    /// Text of the error notification: `Error: <summary> - <detail>`, or just
    /// the summary when no detail is available.
    #[must_use]
    pub fn notification(&self) -> String {
        match self.detail() {
            Some(detail) => format!("Error: {} - {detail}", self.summary()),
            None => format!("Error: {}", self.summary()),
        }
    }
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::ServerError {
                status: err.status().map_or(200, |status| status.as_u16()),
                detail: None,
            };
        }
        Self::NetworkFailure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AuthError::from_response(StatusCode::UNAUTHORIZED, "", true),
            AuthError::InvalidCredentials { detail: None }
        );
        assert_eq!(
            AuthError::from_response(StatusCode::UNAUTHORIZED, "", false),
            AuthError::Unauthenticated
        );
        assert_eq!(
            AuthError::from_response(StatusCode::FORBIDDEN, r#"{"detail":"forbidden"}"#, false),
            AuthError::InvalidCredentials {
                detail: Some("forbidden".to_string())
            }
        );
        assert_eq!(
            AuthError::from_response(
                StatusCode::BAD_REQUEST,
                r#"{"current_password":["Invalid password."]}"#,
                false
            ),
            AuthError::InvalidCredentials {
                detail: Some("Invalid password.".to_string())
            }
        );
        assert_eq!(
            AuthError::from_response(StatusCode::BAD_GATEWAY, "<html>", false),
            AuthError::ServerError {
                status: 502,
                detail: None
            }
        );
    }

    #[test]
    fn test_notification_includes_detail() {
        let error = AuthError::InvalidCredentials {
            detail: Some("forbidden".to_string()),
        };
        assert_eq!(error.notification(), "Error: Request was rejected - forbidden");
    }

    #[test]
    fn test_notification_falls_back_without_detail() {
        let error = AuthError::ServerError {
            status: 500,
            detail: None,
        };
        assert_eq!(error.notification(), "Error: Request failed");
        assert_eq!(
            AuthError::Unauthenticated.notification(),
            "Error: You are not signed in"
        );
    }

    #[test]
    fn test_validation_is_not_notifiable() {
        let errors = FieldErrors {
            email: Some(ValidationError::Required),
            current_password: None,
        };
        assert!(!AuthError::Validation(errors).is_notifiable());
        assert!(AuthError::NetworkFailure("refused".to_string()).is_notifiable());
    }

    #[test]
    fn test_storage_error_conversion() {
        let err: AuthError = StorageError::Poisoned.into();
        assert_eq!(err, AuthError::Storage("session state lock poisoned".to_string()));
    }
}
