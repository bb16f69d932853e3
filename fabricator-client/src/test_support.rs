//! In-memory doubles shared by the controller tests.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use shared::models::{
    AuthToken, CountMetric, CountScope, DeleteAccountRequest, EntityKind, InitialRequest,
    LoginRequest, UserProfile,
};
use tokio::sync::Notify;

use crate::{
    api::Backend,
    error::AuthError,
    notify::{Notification, NotificationSink},
};

pub fn profile() -> UserProfile {
    UserProfile {
        id: 42,
        username: "alice".to_string(),
        email: "alice@example.com".to_string(),
    }
}

pub fn issued_token() -> AuthToken {
    AuthToken::new("access-1").with_refresh("refresh-1")
}

#[derive(Debug, Default, Clone)]
pub struct Calls {
    pub logins: usize,
    pub profile_fetches: usize,
    pub delete_attempts: usize,
    pub deleted: bool,
    pub initializations: usize,
    pub counts: usize,
}

/// Backend accepting `svc`/`pw` and the account password [`FakeBackend::PASSWORD`].
#[derive(Default)]
pub struct FakeBackend {
    calls: Mutex<Calls>,
    login_failure: Mutex<Option<AuthError>>,
    initialize_failure: Mutex<Option<AuthError>>,
    initialize_gate: Mutex<Option<Arc<Notify>>>,
    delete_gate: Mutex<Option<Arc<Notify>>>,
    count_gates: Mutex<HashMap<CountMetric, Arc<Notify>>>,
    counts: Mutex<HashMap<CountMetric, u64>>,
}

impl FakeBackend {
    pub const PASSWORD: &'static str = "correct-horse";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Calls {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_login_with(&self, error: AuthError) {
        *self.login_failure.lock().unwrap() = Some(error);
    }

    pub fn fail_initialize_with(&self, error: AuthError) {
        *self.initialize_failure.lock().unwrap() = Some(error);
    }

    /// Makes `initialize` wait until the returned handle is notified.
    pub fn hold_initialize(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.initialize_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Makes `delete_account` wait until the returned handle is notified.
    pub fn hold_delete(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.delete_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Makes the count for `metric` wait until the returned handle is notified.
    pub fn hold_count(&self, metric: CountMetric) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.count_gates
            .lock()
            .unwrap()
            .insert(metric, gate.clone());
        gate
    }

    pub fn set_count(&self, entity: EntityKind, scope: CountScope, value: u64) {
        self.counts
            .lock()
            .unwrap()
            .insert(CountMetric::new(entity, scope), value);
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn obtain_token(&self, request: &LoginRequest) -> Result<AuthToken, AuthError> {
        self.calls.lock().unwrap().logins += 1;
        if let Some(error) = self.login_failure.lock().unwrap().clone() {
            return Err(error);
        }
        if request.username == "svc" && request.password == "pw" {
            Ok(issued_token())
        } else {
            Err(AuthError::InvalidCredentials {
                detail: Some("No active account found with the given credentials".to_string()),
            })
        }
    }

    async fn current_account(&self, _token: &AuthToken) -> Result<UserProfile, AuthError> {
        self.calls.lock().unwrap().profile_fetches += 1;
        Ok(profile())
    }

    async fn delete_account(
        &self,
        _token: &AuthToken,
        request: &DeleteAccountRequest,
    ) -> Result<(), AuthError> {
        self.calls.lock().unwrap().delete_attempts += 1;
        let gate = self.delete_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let mut calls = self.calls.lock().unwrap();
        if request.current_password == Self::PASSWORD {
            calls.deleted = true;
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials {
                detail: Some("Invalid password.".to_string()),
            })
        }
    }

    async fn initialize(
        &self,
        _token: &AuthToken,
        _request: &InitialRequest,
    ) -> Result<(), AuthError> {
        self.calls.lock().unwrap().initializations += 1;
        let gate = self.initialize_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        match self.initialize_failure.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn count(
        &self,
        _token: Option<&AuthToken>,
        metric: CountMetric,
    ) -> Result<u64, AuthError> {
        self.calls.lock().unwrap().counts += 1;
        let gate = self.count_gates.lock().unwrap().get(&metric).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.counts
            .lock()
            .unwrap()
            .get(&metric)
            .copied()
            .ok_or(AuthError::ServerError {
                status: 500,
                detail: None,
            })
    }
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Notification> {
        self.seen.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.all()
            .into_iter()
            .filter(Notification::is_error)
            .map(|notification| notification.message().to_string())
            .collect()
    }

    pub fn successes(&self) -> Vec<String> {
        self.all()
            .into_iter()
            .filter(|notification| !notification.is_error())
            .map(|notification| notification.message().to_string())
            .collect()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap().push(notification);
    }
}
