use serde::{Deserialize, Serialize};
use std::fmt;

/// Account details returned by the profile endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    /// Backend identifier of the account.
    pub id: u64,

    /// The user's username.
    pub username: String,

    /// The user's email address.
    pub email: String,
}

/// Re-authenticated request to delete the current account.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteAccountRequest {
    /// Email of the account being deleted.
    pub email: String,
    /// Password confirming the deletion.
    pub current_password: String,
}

impl fmt::Debug for DeleteAccountRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeleteAccountRequest")
            .field("email", &self.email)
            .field("current_password", &"<redacted>")
            .finish()
    }
}
