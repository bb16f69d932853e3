//! Profile view with password-confirmed account deletion.

use std::sync::atomic::AtomicBool;

use shared::models::UserProfile;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::{
    context::ClientContext,
    error::AuthError,
    gateway::AuthGateway,
    guard::InFlight,
    routes::Route,
    validation::{DeletionForm, FieldErrors},
};

/// Shown once the backend confirms the deletion.
pub const DELETED_MESSAGE: &str = "Account deleted successfully!";

/// Profile and form as currently displayed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionView {
    /// `None` when the profile could not be loaded.
    pub profile: Option<UserProfile>,
    /// Values last entered.
    pub form: DeletionForm,
    /// Per-field validation messages.
    pub errors: FieldErrors,
}

/// Lifecycle of the profile view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionState {
    /// Profile lookup running.
    Loading,
    /// Form open.
    Viewing(DeletionView),
    /// Deletion request running.
    Submitting,
    /// Account gone and token cleared.
    Deleted,
    /// No usable token.
    Unauthenticated,
}

impl DeletionState {
    /// Where the host must navigate, if anywhere.
    #[must_use]
    pub const fn redirect(&self) -> Option<Route> {
        match self {
            Self::Deleted | Self::Unauthenticated => Some(Route::Login),
            Self::Loading | Self::Viewing(_) | Self::Submitting => None,
        }
    }
}

/// Why a submission was not carried out.
#[derive(Debug, Error)]
pub enum DeletionError {
    /// The view is not in `Viewing`.
    #[error("the deletion form is not open")]
    NotViewing,
    /// A previous submission has not returned yet.
    #[error("a deletion request is already in flight")]
    InFlight,
    /// Validation or backend failure.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Controller behind the profile view.
pub struct AccountDeletionController {
    context: ClientContext,
    gateway: AuthGateway,
    state: watch::Sender<DeletionState>,
    submitting: AtomicBool,
}

impl AccountDeletionController {
    /// Creates a controller in `Loading`; call [`Self::enter`] next.
    #[must_use]
    pub fn new(context: ClientContext) -> Self {
        let gateway = context.gateway();
        Self {
            context,
            gateway,
            state: watch::Sender::new(DeletionState::Loading),
            submitting: AtomicBool::new(false),
        }
    }

    /// Current view state.
    #[must_use]
    pub fn state(&self) -> DeletionState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DeletionState> {
        self.state.subscribe()
    }

    /// Loads the profile. Without a stored token nothing is fetched and the
    /// controller ends in `Unauthenticated`.
    #[instrument(skip(self))]
    pub async fn enter(&self) -> DeletionState {
        if !self.context.store.tokens().has_token() {
            info!("no session; redirecting to login");
            return self.transition(DeletionState::Unauthenticated);
        }

        self.transition(DeletionState::Loading);
        let next = match self.gateway.current_account().await {
            Ok(profile) => DeletionState::Viewing(DeletionView {
                profile: Some(profile),
                ..DeletionView::default()
            }),
            Err(AuthError::Unauthenticated) => DeletionState::Unauthenticated,
            Err(err) => {
                warn!(error = %err, "profile unavailable");
                self.context.notifier.error(&err.notification());
                DeletionState::Viewing(DeletionView::default())
            }
        };
        self.transition(next)
    }

    /// Validates `form` and deletes the account.
    ///
    /// Field errors are kept on the view and never notified. Backend failures
    /// are notified and the submitted values stay on the form.
    ///
    /// # Errors
    /// `NotViewing` unless the form is open, `InFlight` while another
    /// submission runs, `Auth` for validation and backend failures.
    #[instrument(skip_all, fields(email = %form.email))]
    pub async fn submit(&self, form: DeletionForm) -> Result<(), DeletionError> {
        let Some(_in_flight) = InFlight::acquire(&self.submitting) else {
            return Err(DeletionError::InFlight);
        };
        let DeletionState::Viewing(view) = self.state() else {
            return Err(DeletionError::NotViewing);
        };

        let request = match form.validate() {
            Ok(request) => request,
            Err(errors) => {
                self.transition(DeletionState::Viewing(DeletionView {
                    profile: view.profile,
                    form,
                    errors: errors.clone(),
                }));
                return Err(AuthError::Validation(errors).into());
            }
        };

        self.transition(DeletionState::Submitting);
        match self.gateway.delete_account(&request).await {
            Ok(()) => {
                self.finish(view.profile);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "account deletion failed");
                if err.is_notifiable() {
                    self.context.notifier.error(&err.notification());
                }
                self.transition(DeletionState::Viewing(DeletionView {
                    profile: view.profile,
                    form,
                    errors: FieldErrors::default(),
                }));
                Err(err.into())
            }
        }
    }

    fn finish(&self, profile: Option<UserProfile>) {
        self.context.notifier.success(DELETED_MESSAGE);

        let tokens = self.context.store.tokens();
        if let Err(err) = tokens.clear() {
            warn!(error = %err, "could not remove token after deletion");
            self.context
                .notifier
                .error(&AuthError::from(err).notification());
        }

        if tokens.has_token() {
            self.transition(DeletionState::Viewing(DeletionView {
                profile,
                ..DeletionView::default()
            }));
        } else {
            info!("session closed after deletion");
            self.transition(DeletionState::Deleted);
        }
    }

    fn transition(&self, next: DeletionState) -> DeletionState {
        self.state.send_replace(next.clone());
        next
    }
}

impl std::fmt::Debug for AccountDeletionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountDeletionController")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        storage::{MemoryStorage, Storage, StorageError},
        test_support::{FakeBackend, RecordingNotifier, issued_token, profile},
    };

    struct Fixture {
        backend: Arc<FakeBackend>,
        notifier: Arc<RecordingNotifier>,
        controller: AccountDeletionController,
    }

    fn fixture_with(storage: Arc<dyn Storage>) -> Fixture {
        let backend = Arc::new(FakeBackend::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let context = ClientContext::new(backend.clone(), storage, notifier.clone());
        Fixture {
            backend,
            notifier,
            controller: AccountDeletionController::new(context),
        }
    }

    fn logged_in() -> Fixture {
        let storage = Arc::new(MemoryStorage::new());
        let fixture = fixture_with(storage);
        fixture
            .controller
            .context
            .store
            .tokens()
            .set(&issued_token())
            .unwrap();
        fixture
    }

    fn valid_form(password: &str) -> DeletionForm {
        DeletionForm::new("alice@example.com", password)
    }

    /// Tests that entering without a token redirects to login.
    #[tokio::test]
    async fn test_enter_without_token_redirects() {
        let fixture = fixture_with(Arc::new(MemoryStorage::new()));

        let state = fixture.controller.enter().await;

        assert_eq!(state, DeletionState::Unauthenticated);
        assert_eq!(state.redirect(), Some(Route::Login));
        assert_eq!(fixture.backend.calls().profile_fetches, 0);
    }

    /// Tests that entering loads the profile into an empty form.
    #[tokio::test]
    async fn test_enter_shows_profile() {
        let fixture = logged_in();

        let state = fixture.controller.enter().await;

        let DeletionState::Viewing(view) = state else {
            panic!("expected viewing, got {state:?}");
        };
        assert_eq!(view.profile, Some(profile()));
        assert_eq!(view.form, DeletionForm::default());
        assert!(view.errors.is_empty());
    }

    /// Tests that the profile lookup has no side effects.
    #[tokio::test]
    async fn test_profile_lookup_is_idempotent() {
        let fixture = logged_in();
        let gateway = fixture.controller.context.gateway();

        let first = gateway.current_account().await.unwrap();
        let second = gateway.current_account().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(
            fixture.controller.context.store.tokens().get().unwrap(),
            Some(issued_token())
        );
        assert_eq!(fixture.controller.state(), DeletionState::Loading);
    }

    /// Tests that a confirmed deletion clears the token and redirects.
    #[tokio::test]
    async fn test_successful_deletion_closes_session() {
        let fixture = logged_in();
        fixture.controller.enter().await;

        fixture
            .controller
            .submit(valid_form(FakeBackend::PASSWORD))
            .await
            .unwrap();

        let state = fixture.controller.state();
        assert_eq!(state, DeletionState::Deleted);
        assert_eq!(state.redirect(), Some(Route::Login));
        assert!(fixture.backend.calls().deleted);
        assert!(!fixture.controller.context.store.tokens().has_token());
        assert_eq!(
            fixture.notifier.successes(),
            vec![DELETED_MESSAGE.to_string()]
        );
        assert!(fixture.notifier.errors().is_empty());
    }

    /// Tests that a wrong password keeps the session and the entered values.
    #[tokio::test]
    async fn test_wrong_password_keeps_token_and_form() {
        let fixture = logged_in();
        fixture.controller.enter().await;
        let form = valid_form("wrong");

        let result = fixture.controller.submit(form.clone()).await;

        assert!(matches!(
            result,
            Err(DeletionError::Auth(AuthError::InvalidCredentials { .. }))
        ));
        assert_eq!(
            fixture.controller.context.store.tokens().get().unwrap(),
            Some(issued_token())
        );
        let DeletionState::Viewing(view) = fixture.controller.state() else {
            panic!("expected viewing");
        };
        assert_eq!(view.form, form);
        assert_eq!(view.profile, Some(profile()));
        assert_eq!(
            fixture.notifier.errors(),
            vec!["Error: Request was rejected - Invalid password.".to_string()]
        );
    }

    /// Tests that field errors stay local and are not notified.
    #[tokio::test]
    async fn test_invalid_form_never_reaches_backend() {
        let fixture = logged_in();
        fixture.controller.enter().await;

        let result = fixture
            .controller
            .submit(DeletionForm::new("not-an-email", "   "))
            .await;

        assert!(matches!(
            result,
            Err(DeletionError::Auth(AuthError::Validation(_)))
        ));
        assert_eq!(fixture.backend.calls().delete_attempts, 0);
        assert!(fixture.notifier.all().is_empty());

        let DeletionState::Viewing(view) = fixture.controller.state() else {
            panic!("expected viewing");
        };
        assert!(view.errors.email.is_some());
        assert!(view.errors.current_password.is_some());
        assert_eq!(view.form.email, "not-an-email");
    }

    /// Tests that submitting before the form is open is rejected.
    #[tokio::test]
    async fn test_submit_requires_open_form() {
        let fixture = fixture_with(Arc::new(MemoryStorage::new()));
        fixture.controller.enter().await;

        let result = fixture
            .controller
            .submit(valid_form(FakeBackend::PASSWORD))
            .await;

        assert!(matches!(result, Err(DeletionError::NotViewing)));
        assert_eq!(fixture.backend.calls().delete_attempts, 0);
    }

    /// Tests that a second submission while one is outstanding is rejected.
    #[tokio::test]
    async fn test_double_submit_sends_one_request() {
        let fixture = logged_in();
        let gate = fixture.backend.hold_delete();
        fixture.controller.enter().await;

        let first = fixture.controller.submit(valid_form(FakeBackend::PASSWORD));
        let second = async {
            while fixture.backend.calls().delete_attempts == 0 {
                tokio::task::yield_now().await;
            }
            let result = fixture
                .controller
                .submit(valid_form(FakeBackend::PASSWORD))
                .await;
            gate.notify_one();
            result
        };
        let (first, second) = tokio::join!(first, second);

        first.unwrap();
        assert!(matches!(second, Err(DeletionError::InFlight)));
        assert_eq!(fixture.backend.calls().delete_attempts, 1);
        assert_eq!(fixture.controller.state(), DeletionState::Deleted);
        assert_eq!(
            fixture.notifier.successes(),
            vec![DELETED_MESSAGE.to_string()]
        );
    }

    /// Storage whose removals silently fail.
    #[derive(Default)]
    struct StickyStorage(MemoryStorage);

    impl Storage for StickyStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.0.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.0.set(key, value)
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    /// Tests that a token surviving removal keeps the view open.
    #[tokio::test]
    async fn test_lingering_token_keeps_view_open() {
        let fixture = fixture_with(Arc::new(StickyStorage::default()));
        fixture
            .controller
            .context
            .store
            .tokens()
            .set(&issued_token())
            .unwrap();
        fixture.controller.enter().await;

        fixture
            .controller
            .submit(valid_form(FakeBackend::PASSWORD))
            .await
            .unwrap();

        let state = fixture.controller.state();
        assert!(matches!(state, DeletionState::Viewing(_)));
        assert_eq!(state.redirect(), None);
        assert_eq!(
            fixture.notifier.successes(),
            vec![DELETED_MESSAGE.to_string()]
        );
    }
}
