//! UI collaborators driven by the gateway: error display, loading
//! indicator and navigation.

use tokio::sync::watch;
use tracing::trace;

use crate::api::ErrorPayload;

/// State shown by the error display and the global loading indicator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    pub loading: bool,
    pub errors: Option<ErrorPayload>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    /// A form submission is in flight.
    LoadingUi,
    /// Shows a backend error payload and stops the indicator.
    SetErrors(ErrorPayload),
    /// Hides errors and stops the indicator.
    ClearErrors,
    /// Stops the indicator, leaving errors untouched.
    StopLoadingUi,
}

impl UiState {
    pub fn apply(&mut self, action: UiAction) {
        match action {
            UiAction::LoadingUi => self.loading = true,
            UiAction::SetErrors(payload) => {
                self.loading = false;
                self.errors = Some(payload);
            }
            UiAction::ClearErrors => {
                self.loading = false;
                self.errors = None;
            }
            UiAction::StopLoadingUi => self.loading = false,
        }
    }
}

/// Shared handle to the UI state, same shape as
/// [`SessionStore`](crate::core::session::SessionStore).
#[derive(Debug, Clone)]
pub struct UiStore {
    tx: watch::Sender<UiState>,
}

impl Default for UiStore {
    fn default() -> Self {
        let (tx, _rx) = watch::channel(UiState::default());
        Self { tx }
    }
}

impl UiStore {
    pub fn dispatch(&self, action: UiAction) {
        trace!(?action, "ui dispatch");
        self.tx.send_modify(|state| state.apply(action));
    }

    pub fn snapshot(&self) -> UiState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.tx.subscribe()
    }

    pub fn errors(&self) -> Option<ErrorPayload> {
        self.tx.borrow().errors.clone()
    }
}

/// Route changes requested by the gateway after login/signup.
pub trait Navigator: Send + Sync {
    fn push(&self, path: &str);
}

/// Navigator that only records the requested route in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn push(&self, path: &str) {
        tracing::debug!(path, "navigate");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_errors_stops_loading() {
        let store = UiStore::default();
        store.dispatch(UiAction::LoadingUi);
        assert!(store.snapshot().loading);

        store.dispatch(UiAction::SetErrors(ErrorPayload::general("nope")));

        let state = store.snapshot();
        assert!(!state.loading);
        assert_eq!(state.errors.unwrap().field("general"), Some("nope"));
    }

    #[test]
    fn test_clear_errors_resets_everything() {
        let mut state = UiState {
            loading: true,
            errors: Some(ErrorPayload::general("x")),
        };
        state.apply(UiAction::ClearErrors);
        assert_eq!(state, UiState::default());
    }

    #[test]
    fn test_stop_loading_keeps_errors() {
        let mut state = UiState {
            loading: true,
            errors: Some(ErrorPayload::general("x")),
        };
        state.apply(UiAction::StopLoadingUi);
        assert!(!state.loading);
        assert!(state.errors.is_some());
    }
}
