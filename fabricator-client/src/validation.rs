//! Validation logic for the account deletion form.
//!
//! Runs synchronously before any network call. Failures are field-scoped and
//! rendered inline; they never reach the notification layer.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use shared::models::DeleteAccountRequest;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap_or_else(|err| unreachable!("{err}"))
});

/// Validation errors that can occur during form validation.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ValidationError {
    /// Field is required but empty
    Required,
    /// Email address is not well formed
    InvalidEmail,
}

impl ValidationError {
    /// Inline message for the given field.
    #[must_use]
    pub fn message(self, field: &str) -> String {
        match self {
            Self::Required => format!("{field} is a required field"),
            Self::InvalidEmail => format!("{field} must be a valid email"),
        }
    }
}

/// Validates an email address.
///
/// # Validation rules
/// - Email must not be empty
/// - Email must look like `local@domain.tld` with no whitespace
///
/// # Errors
/// Returns the first rule the input breaks.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required);
    }

    if !EMAIL_PATTERN.is_match(trimmed) {
        return Err(ValidationError::InvalidEmail);
    }

    Ok(())
}

/// Validates the re-entered password.
///
/// # Validation rules
/// - Password must not be empty after trimming
///
/// # Errors
/// Returns [`ValidationError::Required`] for blank input.
pub fn validate_current_password(password: &str) -> Result<(), ValidationError> {
    if password.trim().is_empty() {
        return Err(ValidationError::Required);
    }

    Ok(())
}

/// Per-field validation failures of the deletion form.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors {
    /// Problem with the email, if any.
    pub email: Option<ValidationError>,
    /// Problem with the password, if any.
    pub current_password: Option<ValidationError>,
}

impl FieldErrors {
    /// Whether no field has a problem.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.email.is_none() && self.current_password.is_none()
    }

    /// Inline messages keyed by field name.
    #[must_use]
    pub fn messages(&self) -> Vec<(&'static str, String)> {
        let mut messages = Vec::new();
        if let Some(error) = self.email {
            messages.push(("email", error.message("email")));
        }
        if let Some(error) = self.current_password {
            messages.push(("current_password", error.message("current_password")));
        }
        messages
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .messages()
            .into_iter()
            .map(|(_, message)| message)
            .collect();
        f.write_str(&rendered.join(", "))
    }
}

/// User-entered values of the deletion form.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct DeletionForm {
    /// Email as typed.
    pub email: String,
    /// Password as typed.
    pub current_password: String,
}

impl DeletionForm {
    /// Form holding the given values.
    pub fn new(email: impl Into<String>, current_password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            current_password: current_password.into(),
        }
    }

    /// Checks every field and builds the request from the trimmed values.
    ///
    /// # Errors
    /// Returns all field failures at once.
    pub fn validate(&self) -> Result<DeleteAccountRequest, FieldErrors> {
        let errors = FieldErrors {
            email: validate_email(&self.email).err(),
            current_password: validate_current_password(&self.current_password).err(),
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(DeleteAccountRequest {
            email: self.email.trim().to_string(),
            current_password: self.current_password.trim().to_string(),
        })
    }
}

impl fmt::Debug for DeletionForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeletionForm")
            .field("email", &self.email)
            .field("current_password", &"<redacted>")
            .finish()
    }
}

/// Validates a request assembled outside the form.
///
/// # Errors
/// Returns all field failures at once.
pub fn validate_request(request: &DeleteAccountRequest) -> Result<(), FieldErrors> {
    DeletionForm::new(&request.email, &request.current_password)
        .validate()
        .map(|_| ())
}
