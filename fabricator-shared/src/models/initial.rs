use serde::{Deserialize, Serialize};

/// Action name the backend expects for the bootstrap seeding run.
pub const INITIAL_ACTION: &str = "init";

/// Represents a request to seed (and reset) generated demonstration data.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct InitialRequest {
    /// Action name, [`INITIAL_ACTION`] for the seeding run.
    pub name: String,
}

impl Default for InitialRequest {
    fn default() -> Self {
        Self {
            name: INITIAL_ACTION.to_string(),
        }
    }
}
