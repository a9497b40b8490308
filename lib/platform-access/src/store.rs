//! The session store: in-memory session state mirrored to durable storage.
//!
//! Lifecycle: a new store is [`SessionState::Loading`] until [`SessionStore::rehydrate`]
//! runs. Rehydration ends in `Active` or `Cleared`; it never fails. Login,
//! logout, and profile edits write through to storage synchronously so a
//! reload observes the same state.

use chrono::{DateTime, Utc};
use medicare_core::Result;
use tracing::{debug, info, warn};

use crate::error::StorageError;
use crate::identity::{Identity, IdentityPatch};
use crate::role::Role;
use crate::session::{Session, SessionPolicy};
use crate::storage::{AUTH_KEY, DurableStorage, LEGACY_KEYS, REMEMBER_KEY};

/// Where the store is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Durable storage has not been read yet.
    Loading,
    /// A session is in effect.
    Active(Session),
    /// No session: never logged in, logged out, or expired.
    Cleared,
}

impl SessionState {
    /// Returns the session, if one is in effect.
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Active(session) => Some(session),
            Self::Loading | Self::Cleared => None,
        }
    }

    /// Returns the current role, [`Role::Guest`] when no session is in effect.
    #[must_use]
    pub fn role(&self) -> Role {
        self.session().map_or(Role::Guest, Session::role)
    }

    /// Returns true while durable storage has not been read.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// Session state plus the storage it persists to.
#[derive(Debug, Clone)]
pub struct SessionStore<S> {
    storage: S,
    policy: SessionPolicy,
    state: SessionState,
}

impl<S: DurableStorage> SessionStore<S> {
    /// Creates a store in the `Loading` state.
    #[must_use]
    pub fn new(storage: S, policy: SessionPolicy) -> Self {
        Self {
            storage,
            policy,
            state: SessionState::Loading,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Returns the active session, if any.
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.state.session()
    }

    /// Returns the expiry policy.
    #[must_use]
    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    /// Reconstructs the session from durable storage.
    pub fn rehydrate(&mut self) {
        self.rehydrate_at(Utc::now());
    }

    /// Reconstructs the session from durable storage as of `now`.
    ///
    /// Missing, unreadable, or expired documents leave the store `Cleared`;
    /// unreadable and expired documents are also removed from storage. A
    /// document issued after `now` counts as unreadable.
    pub fn rehydrate_at(&mut self, now: DateTime<Utc>) {
        self.remove_legacy_keys();

        let Some(raw) = self.storage.get(AUTH_KEY) else {
            debug!("no persisted session");
            self.state = SessionState::Cleared;
            return;
        };

        let session = match serde_json::from_str::<Session>(&raw) {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "discarding unreadable persisted session");
                self.storage.remove(AUTH_KEY);
                self.state = SessionState::Cleared;
                return;
            }
        };

        if session.issued() > now {
            warn!(
                issued_at = %session.issued(),
                "discarding persisted session issued in the future"
            );
            self.storage.remove(AUTH_KEY);
            self.state = SessionState::Cleared;
            return;
        }

        if !session.role().is_authenticated() {
            warn!("discarding persisted session with guest role");
            self.storage.remove(AUTH_KEY);
            self.state = SessionState::Cleared;
            return;
        }

        if session.is_expired_at(&self.policy, now) {
            info!(
                issued_at = %session.issued(),
                "persisted session expired"
            );
            self.storage.remove(AUTH_KEY);
            self.state = SessionState::Cleared;
            return;
        }

        debug!(role = %session.role(), "rehydrated session");
        self.state = SessionState::Active(session);
    }

    /// Starts a session and persists it.
    pub fn login(&mut self, user: Identity, role: Role, token: Option<String>) {
        let session = Session::new(user, role, token);
        info!(role = %role, user_id = %session.user().id(), "session started");
        self.remove_legacy_keys();
        if let Err(e) = self.persist(&session) {
            warn!(error = %e, "failed to persist session");
        }
        self.state = SessionState::Active(session);
    }

    /// Ends the session and clears persisted state.
    pub fn logout(&mut self) {
        if let Some(session) = self.state.session() {
            info!(user_id = %session.user().id(), "session ended");
        }
        self.storage.remove(AUTH_KEY);
        self.remove_legacy_keys();
        self.state = SessionState::Cleared;
    }

    /// Merges a partial update into the session identity and re-persists.
    ///
    /// Does nothing without an active session.
    pub fn update_user(&mut self, patch: IdentityPatch) {
        let SessionState::Active(session) = &mut self.state else {
            debug!("ignoring profile update without a session");
            return;
        };
        session.update_user(patch);
        let session = session.clone();
        if let Err(e) = self.persist(&session) {
            warn!(error = %e, "failed to persist profile update");
        }
    }

    /// Remembers (or forgets) the email shown on the login form.
    pub fn remember_email(&self, email: Option<&str>) {
        match email {
            Some(email) if !email.trim().is_empty() => {
                if let Err(e) = self.storage.set(REMEMBER_KEY, email.trim()) {
                    warn!(error = %e, "failed to remember login email");
                }
            }
            _ => self.storage.remove(REMEMBER_KEY),
        }
    }

    /// Returns the email remembered by the login form.
    #[must_use]
    pub fn remembered_email(&self) -> Option<String> {
        self.storage.get(REMEMBER_KEY)
    }

    fn persist(&self, session: &Session) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(session).map_err(|e| StorageError::Encode {
            key: AUTH_KEY.to_string(),
            reason: e.to_string(),
        })?;
        self.storage.set(AUTH_KEY, &encoded)
    }

    fn remove_legacy_keys(&self) {
        for key in LEGACY_KEYS {
            self.storage.remove(key);
        }
    }
}
