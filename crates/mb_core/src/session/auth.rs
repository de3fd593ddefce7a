//! Authentication state shared with every part of the app that reacts to it.

use serde::{Deserialize, Serialize};

use super::subject::{Subject, Subscription};

/// The signed-in user as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Snapshot of the authentication state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthState {
    pub user: Option<User>,
    /// Bearer token for API calls.
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// A login or session check is in flight.
    pub is_loading: bool,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }
}

/// Owned store for [`AuthState`].
///
/// Create one per app (or per test) and hand clones to whoever needs it.
#[derive(Debug, Clone, Default)]
pub struct AuthStore {
    subject: Subject<AuthState>,
}

impl AuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&AuthState) + Send + Sync + 'static,
    {
        self.subject.subscribe(callback)
    }

    pub fn snapshot(&self) -> AuthState {
        self.subject.snapshot()
    }

    pub fn is_authenticated(&self) -> bool {
        self.subject.snapshot().is_authenticated()
    }

    pub fn set_loading(&self, loading: bool) {
        self.subject.update(|state| state.is_loading = loading);
    }

    pub fn login(&self, user: User, token: impl Into<String>) {
        tracing::info!("Signed in as {}", user.email);
        self.subject.set(AuthState {
            user: Some(user),
            token: Some(token.into()),
            is_loading: false,
        });
    }

    pub fn logout(&self) {
        tracing::info!("Signed out");
        self.subject.set(AuthState::default());
    }
}
