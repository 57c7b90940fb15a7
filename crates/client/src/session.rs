//! Session service.
//!
//! Holds the authenticated identity derived from the persisted token pair
//! and drives the login/restore/logout lifecycle. The service is an
//! explicit, injectable object (not an ambient singleton); views observe
//! the current state through a watch channel and re-render on change.
//!
//! # State machine
//!
//! - `Loading` - initial, while a silent restore may still be running
//! - `Authenticated` - identity present; implies the backend accepted the
//!   stored access token at least once
//! - `Unauthenticated` - no identity; no session exists without a token
//!   pair, so this state also means the store is (being) cleared
//!
//! There is no proactive token-expiry timer; [`Session::refresh_user`] is
//! the sole re-validation path.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tracing::instrument;

use tiffin_core::{Phone, PhoneError, Role};

use crate::api::ApiClient;
use crate::api::types::User;
use crate::error::ApiError;

/// Errors surfaced by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The phone number failed local validation; nothing was sent.
    #[error("{0}")]
    InvalidPhone(#[from] PhoneError),

    /// A backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Current authentication state.
#[derive(Debug, Clone)]
pub enum SessionState {
    /// Startup restore has not finished yet.
    Loading,
    /// An identity is present.
    Authenticated(User),
    /// No identity.
    Unauthenticated,
}

impl SessionState {
    /// Whether an identity is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// The identity, if present.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// The session service.
///
/// Cheap to clone; all clones share one state.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    api: ApiClient,
    state: watch::Sender<SessionState>,
}

impl Session {
    /// Create a session in the `Loading` state.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let (state, _) = watch::channel(SessionState::Loading);
        Self {
            inner: Arc::new(SessionInner { api, state }),
        }
    }

    /// Subscribe to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn current(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// The current identity, if authenticated.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.current().user().cloned()
    }

    /// Whether an identity is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current().is_authenticated()
    }

    /// The client this session wraps.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    fn set_state(&self, state: SessionState) {
        // send_replace so the update goes through even with no subscribers
        let _ = self.inner.state.send_replace(state);
    }

    /// Attempt a silent restore from the persisted token pair.
    ///
    /// Call once at startup. If a token is stored, the identity is
    /// fetched with it; a failure means the token is invalid or expired,
    /// so the pair is cleared and the session ends `Unauthenticated`.
    #[instrument(skip(self))]
    pub async fn restore(&self) {
        if !self.inner.api.has_credentials() {
            self.set_state(SessionState::Unauthenticated);
            return;
        }

        match self.inner.api.get_current_user().await {
            Ok(user) => {
                tracing::debug!(user_id = %user.id, "session restored");
                self.set_state(SessionState::Authenticated(user));
            }
            Err(err) => {
                tracing::warn!(error = %err, "silent restore failed; clearing session");
                self.inner.api.logout().await;
                self.set_state(SessionState::Unauthenticated);
            }
        }
    }

    /// Log in with a phone number and requested role.
    ///
    /// The phone number is validated locally first; an invalid number is
    /// rejected without any network call. On success the token pair is
    /// persisted and the identity fetched. Any failure leaves the session
    /// `Unauthenticated` with no partial state - in particular, a failed
    /// identity fetch right after the token exchange clears the
    /// just-persisted tokens.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidPhone` for a malformed number, or
    /// the underlying `ApiError` for backend failures.
    #[instrument(skip(self, phone_number))]
    pub async fn login(&self, phone_number: &str, role: Role) -> Result<(), SessionError> {
        let phone = Phone::parse(phone_number)?;

        self.set_state(SessionState::Loading);

        if let Err(err) = self.inner.api.login(&phone, role).await {
            self.set_state(SessionState::Unauthenticated);
            return Err(err.into());
        }

        match self.inner.api.get_current_user().await {
            Ok(user) => {
                tracing::debug!(user_id = %user.id, "login succeeded");
                self.set_state(SessionState::Authenticated(user));
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "identity fetch after login failed");
                self.inner.api.logout().await;
                self.set_state(SessionState::Unauthenticated);
                Err(err.into())
            }
        }
    }

    /// Log out.
    ///
    /// Always succeeds locally: the backend notification is best-effort
    /// and the identity and token pair are cleared unconditionally.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        self.inner.api.logout().await;
        self.set_state(SessionState::Unauthenticated);
    }

    /// Re-fetch the identity with the current token.
    ///
    /// This is the sole re-validation path. A failure treats the token
    /// as invalid: the identity is cleared and logout cleanup runs.
    ///
    /// # Errors
    ///
    /// Returns the underlying `ApiError` when the fetch fails.
    #[instrument(skip(self))]
    pub async fn refresh_user(&self) -> Result<(), SessionError> {
        match self.inner.api.get_current_user().await {
            Ok(user) => {
                self.set_state(SessionState::Authenticated(user));
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "identity refresh failed; clearing session");
                self.inner.api.logout().await;
                self.set_state(SessionState::Unauthenticated);
                Err(err.into())
            }
        }
    }
}
