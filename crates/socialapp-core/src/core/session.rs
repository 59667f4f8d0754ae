//! Session store: the authenticated user's state and its transitions.
//!
//! State changes only through [`SessionAction`]. Applying an action is pure:
//! no I/O, no failure. Network effects live in [`crate::core::gateway`].

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::trace;

use crate::api::{Credentials, Like, Notification, UserData};

/// Session state for the current user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub authenticated: bool,
    /// True while user data is being (re)fetched.
    pub loading: bool,
    pub credentials: Credentials,
    pub likes: Vec<Like>,
    pub notifications: Vec<Notification>,
}

/// Transitions accepted by the session store.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    /// Marks the session authenticated without touching user data.
    SetAuthenticated,
    /// Marks the session unauthenticated. User data is kept as-is.
    SetUnAuthenticated,
    /// Replaces credentials, likes and notifications wholesale.
    SetUser(UserData),
    /// A user data fetch has started.
    LoadingUser,
    /// A user data fetch ended without producing data.
    LoadingFailed,
    /// Records a like on the given scream by the current handle.
    LikeScream(String),
    /// Drops every like on the given scream.
    UnlikeScream(String),
    /// Marks every notification read.
    SetNotificationsRead,
}

impl SessionAction {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            SessionAction::SetAuthenticated => "set_authenticated",
            SessionAction::SetUnAuthenticated => "set_unauthenticated",
            SessionAction::SetUser(_) => "set_user",
            SessionAction::LoadingUser => "loading_user",
            SessionAction::LoadingFailed => "loading_failed",
            SessionAction::LikeScream(_) => "like_scream",
            SessionAction::UnlikeScream(_) => "unlike_scream",
            SessionAction::SetNotificationsRead => "set_notifications_read",
        }
    }
}

impl SessionState {
    /// Applies a transition in place.
    pub fn apply(&mut self, action: SessionAction) {
        match action {
            SessionAction::SetAuthenticated => self.authenticated = true,
            SessionAction::SetUnAuthenticated => self.authenticated = false,
            SessionAction::SetUser(data) => {
                self.authenticated = true;
                self.loading = false;
                self.credentials = data.credentials;
                self.likes = data.likes;
                self.notifications = data.notifications;
            }
            SessionAction::LoadingUser => self.loading = true,
            SessionAction::LoadingFailed => self.loading = false,
            SessionAction::LikeScream(scream_id) => {
                // No uniqueness check: a second like on the same scream appends again.
                self.likes.push(Like {
                    user_handle: self.credentials.handle.clone(),
                    scream_id,
                });
            }
            SessionAction::UnlikeScream(scream_id) => {
                self.likes.retain(|like| like.scream_id != scream_id);
            }
            SessionAction::SetNotificationsRead => {
                for notification in &mut self.notifications {
                    notification.read = true;
                }
            }
        }
    }

    pub fn has_liked(&self, scream_id: &str) -> bool {
        self.likes.iter().any(|like| like.scream_id == scream_id)
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }

    /// Ids of unread notifications that carry one.
    pub fn unread_notification_ids(&self) -> Vec<String> {
        self.notifications
            .iter()
            .filter(|n| !n.read)
            .filter_map(|n| n.notification_id.clone())
            .collect()
    }
}

/// Pure functional form of [`SessionState::apply`].
pub fn reduce(mut state: SessionState, action: SessionAction) -> SessionState {
    state.apply(action);
    state
}

/// Shared handle to the session state.
///
/// Cloning the handle shares the same state. Readers either take a
/// [`snapshot`](Self::snapshot) or [`subscribe`](Self::subscribe) to be
/// woken on every dispatch.
#[derive(Debug, Clone)]
pub struct SessionStore {
    tx: watch::Sender<SessionState>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionState::default())
    }
}

impl SessionStore {
    pub fn new(initial: SessionState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Applies a transition and notifies subscribers.
    pub fn dispatch(&self, action: SessionAction) {
        trace!(action = action.name(), "session dispatch");
        self.tx.send_modify(|state| state.apply(action));
    }

    pub fn snapshot(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    pub fn authenticated(&self) -> bool {
        self.tx.borrow().authenticated
    }

    pub fn loading(&self) -> bool {
        self.tx.borrow().loading
    }

    pub fn credentials(&self) -> Credentials {
        self.tx.borrow().credentials.clone()
    }

    pub fn likes(&self) -> Vec<Like> {
        self.tx.borrow().likes.clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.tx.borrow().notifications.clone()
    }
}
