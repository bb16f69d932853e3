pub mod auth;
pub mod errors;
pub mod initial;
pub mod metrics;
pub mod user;

pub use auth::{AuthToken, Credentials, LoginRequest};
pub use errors::ErrorResponse;
pub use initial::InitialRequest;
pub use metrics::{CountMetric, CountScope, EntityKind};
pub use user::{DeleteAccountRequest, UserProfile};
