//! Network gateway: the session operations the UI dispatches.
//!
//! Each operation issues at most one request per step, waits for it, then
//! feeds the outcome into the [`SessionStore`] and [`UiStore`]. Only the
//! loading flags change before a response arrives.
//!
//! Failures follow one rule: a structured backend rejection is forwarded to
//! the error display, anything else is logged. Loading flags are reset on
//! every failure path. The error is also returned so callers that are not a
//! UI (the CLI, tests) can react to it.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::api::{
    ApiClient, ApiError, ApiResult, ImageUpload, LoginRequest, SignupRequest, TokenResponse,
    UserDetails,
};
use crate::auth::{self, CredentialStore};
use crate::core::session::{SessionAction, SessionStore};
use crate::core::ui::{Navigator, UiAction, UiStore};

/// Route the UI is sent to after a successful login or signup.
pub const HOME_ROUTE: &str = "/";

/// Outcome of [`Gateway::restore_session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRestore {
    /// No token was persisted.
    NoToken,
    /// The persisted token had expired and was discarded.
    Expired,
    /// The token was installed and user data was requested.
    Restored,
}

pub struct Gateway {
    api: ApiClient,
    credentials: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    session: SessionStore,
    ui: UiStore,
    cancel: Mutex<CancellationToken>,
    /// Generation of the latest `GET /user`; older responses are dropped.
    user_fetch: AtomicU64,
}

impl Gateway {
    pub fn new(
        api: ApiClient,
        credentials: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            api,
            credentials,
            navigator,
            session: SessionStore::default(),
            ui: UiStore::default(),
            cancel: Mutex::new(CancellationToken::new()),
            user_fetch: AtomicU64::new(0),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn ui(&self) -> &UiStore {
        &self.ui
    }

    /// Cancels every request currently in flight.
    ///
    /// Cancelled operations fail with [`ApiErrorKind::Cancelled`](crate::api::ApiErrorKind)
    /// and reset their loading flags. Requests started afterwards are
    /// unaffected.
    pub fn cancel_in_flight(&self) {
        let mut token = self.cancel.lock().unwrap_or_else(PoisonError::into_inner);
        token.cancel();
        *token = CancellationToken::new();
    }

    /// `POST /login`, then persist the token and load the user.
    pub async fn login_user(&self, request: LoginRequest) -> ApiResult<()> {
        self.ui.dispatch(UiAction::LoadingUi);
        let result = self.guarded(self.api.login(&request)).await;
        self.complete_auth("login", result).await
    }

    /// `POST /signup`, then persist the token and load the user.
    pub async fn signup_user(&self, request: SignupRequest) -> ApiResult<()> {
        self.ui.dispatch(UiAction::LoadingUi);
        let result = self.guarded(self.api.signup(&request)).await;
        self.complete_auth("signup", result).await
    }

    async fn complete_auth(
        &self,
        op: &'static str,
        result: ApiResult<TokenResponse>,
    ) -> ApiResult<()> {
        let response = match result {
            Ok(response) => response,
            Err(err) => {
                self.forward_error(op, &err);
                return Err(err);
            }
        };

        if let Err(err) =
            auth::set_authorization_header(&response.token, self.credentials.as_ref(), &self.api)
        {
            warn!(
                op,
                error = %format!("{err:#}"),
                "token not persisted; session will not survive restart"
            );
            self.api.set_authorization(Some(auth::bearer(&response.token)));
        }
        info!(op, "authenticated");

        // Fetch failures are logged inside; the login itself succeeded unless
        // the session was torn down while the fetch was in flight.
        if let Err(err) = self.get_user_data().await
            && err.is_cancelled()
        {
            self.ui.dispatch(UiAction::StopLoadingUi);
            return Err(err);
        }
        self.ui.dispatch(UiAction::ClearErrors);
        self.navigator.push(HOME_ROUTE);
        Ok(())
    }

    /// `GET /user` into the session store.
    pub async fn get_user_data(&self) -> ApiResult<()> {
        let generation = self.user_fetch.fetch_add(1, Ordering::SeqCst) + 1;
        self.session.dispatch(SessionAction::LoadingUser);

        let result = self.guarded(self.api.user()).await;
        let current = self.user_fetch.load(Ordering::SeqCst) == generation;

        match result {
            Ok(data) if current => {
                self.session.dispatch(SessionAction::SetUser(data));
                Ok(())
            }
            Ok(_) => {
                debug!(generation, "dropping superseded user data");
                Ok(())
            }
            Err(err) => {
                log_failure("get_user_data", &err);
                if current {
                    self.session.dispatch(SessionAction::LoadingFailed);
                }
                Err(err)
            }
        }
    }

    /// Forgets the token locally. No request is made.
    pub fn logout_user(&self) {
        self.cancel_in_flight();
        if let Err(err) = auth::clear_authorization_header(self.credentials.as_ref(), &self.api) {
            warn!(error = %format!("{err:#}"), "failed to remove persisted token");
        }
        self.session.dispatch(SessionAction::SetUnAuthenticated);
        info!("logged out");
    }

    /// `POST /user/image`, then reload the user.
    pub async fn upload_image(&self, image: ImageUpload) -> ApiResult<()> {
        let generation = self.user_fetch.load(Ordering::SeqCst);
        self.session.dispatch(SessionAction::LoadingUser);
        let result = self.guarded(self.api.upload_image(image)).await;
        self.then_reload_user("upload_image", generation, result).await
    }

    /// `POST /user`, then reload the user.
    pub async fn edit_user_details(&self, details: UserDetails) -> ApiResult<()> {
        let generation = self.user_fetch.load(Ordering::SeqCst);
        self.session.dispatch(SessionAction::LoadingUser);
        let result = self.guarded(self.api.edit_details(&details)).await;
        self.then_reload_user("edit_user_details", generation, result).await
    }

    /// `generation` is the fetch counter observed before the request; a
    /// failure only clears `loading` if no `GET /user` started since then.
    async fn then_reload_user(
        &self,
        op: &'static str,
        generation: u64,
        result: ApiResult<()>,
    ) -> ApiResult<()> {
        if let Err(err) = result {
            log_failure(op, &err);
            if self.user_fetch.load(Ordering::SeqCst) == generation {
                self.session.dispatch(SessionAction::LoadingFailed);
            }
            return Err(err);
        }
        match self.get_user_data().await {
            Err(err) if err.is_cancelled() => Err(err),
            _ => Ok(()),
        }
    }

    /// `POST /notifications`, then mark every notification read.
    pub async fn mark_notifications_read(&self, ids: Vec<String>) -> ApiResult<()> {
        self.guarded(self.api.mark_notifications_read(&ids))
            .await
            .inspect_err(|err| log_failure("mark_notifications_read", err))?;
        self.session.dispatch(SessionAction::SetNotificationsRead);
        Ok(())
    }

    /// `GET /scream/{id}/like`, then record the like.
    pub async fn like_scream(&self, scream_id: &str) -> ApiResult<()> {
        self.guarded(self.api.like_scream(scream_id))
            .await
            .inspect_err(|err| log_failure("like_scream", err))?;
        self.session
            .dispatch(SessionAction::LikeScream(scream_id.to_string()));
        Ok(())
    }

    /// `GET /scream/{id}/unlike`, then drop the like.
    pub async fn unlike_scream(&self, scream_id: &str) -> ApiResult<()> {
        self.guarded(self.api.unlike_scream(scream_id))
            .await
            .inspect_err(|err| log_failure("unlike_scream", err))?;
        self.session
            .dispatch(SessionAction::UnlikeScream(scream_id.to_string()));
        Ok(())
    }

    /// Re-installs a persisted token at start-up.
    ///
    /// Expired tokens are discarded through [`logout_user`](Self::logout_user).
    /// A valid token marks the session authenticated and triggers a user
    /// fetch, whose failure is returned.
    pub async fn restore_session(&self) -> ApiResult<SessionRestore> {
        let stored = match auth::stored_authorization(self.credentials.as_ref()) {
            Ok(stored) => stored,
            Err(err) => {
                warn!(error = %format!("{err:#}"), "failed to read persisted token");
                None
            }
        };

        let Some(value) = stored else {
            debug!("no persisted token");
            return Ok(SessionRestore::NoToken);
        };

        if auth::is_expired(&value) {
            info!("persisted token expired");
            self.logout_user();
            return Ok(SessionRestore::Expired);
        }

        self.api.set_authorization(Some(value));
        self.session.dispatch(SessionAction::SetAuthenticated);
        self.get_user_data().await?;
        Ok(SessionRestore::Restored)
    }

    fn forward_error(&self, op: &'static str, err: &ApiError) {
        match &err.payload {
            Some(payload) if err.is_rejected() => {
                warn!(op, error = %err, "request rejected");
                self.ui.dispatch(UiAction::SetErrors(payload.clone()));
            }
            _ => {
                log_failure(op, err);
                self.ui.dispatch(UiAction::StopLoadingUi);
            }
        }
    }

    /// Races a request against the current cancellation token.
    async fn guarded<T>(&self, request: impl Future<Output = ApiResult<T>>) -> ApiResult<T> {
        let token = self
            .cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        tokio::select! {
            () = token.cancelled() => Err(ApiError::cancelled()),
            result = request => result,
        }
    }
}

fn log_failure(op: &'static str, err: &ApiError) {
    error!(op, kind = %err.kind, error = %err, "request failed");
}
