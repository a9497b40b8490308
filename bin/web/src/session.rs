//! The session store as shared UI state.
//!
//! The store lives in a signal provided through context. It starts in
//! `Loading` on both server and client, so the first client render matches
//! the server's HTML; rehydration from `localStorage` happens in an effect
//! after hydration.

use crate::data::session_max_age_hours;
use leptos::prelude::*;
use leptos::task::spawn_local;
use medicare_core::Result;
use medicare_platform_access::{
    DurableStorage, Identity, IdentityPatch, Role, SessionPolicy, SessionState, SessionStore,
    StorageError,
};

/// `window.localStorage`. In server builds reads miss and writes fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

#[cfg(feature = "hydrate")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

#[cfg(feature = "hydrate")]
impl DurableStorage for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        local_storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = local_storage().ok_or_else(|| StorageError::Unavailable {
            reason: "localStorage is not available".to_string(),
        })?;
        storage.set_item(key, value).map_err(|e| StorageError::WriteFailed {
            key: key.to_string(),
            reason: format!("{e:?}"),
        })?;
        Ok(())
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = local_storage()
            && let Err(e) = storage.remove_item(key)
        {
            tracing::warn!(key, error = ?e, "Failed to remove storage key");
        }
    }
}

#[cfg(not(feature = "hydrate"))]
impl DurableStorage for BrowserStorage {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable {
            reason: "no browser storage on the server".to_string(),
        }
        .into())
    }

    fn remove(&self, _key: &str) {}
}

/// Handle to the shared session store.
#[derive(Clone, Copy)]
pub struct SessionContext(RwSignal<SessionStore<BrowserStorage>>);

impl SessionContext {
    /// Returns the current state; reading it subscribes the caller.
    pub fn state(&self) -> SessionState {
        self.0.with(|store| store.state().clone())
    }

    /// Returns the current role, `Guest` without a session.
    pub fn role(&self) -> Role {
        self.0.with(|store| store.state().role())
    }

    /// Returns the signed-in identity, if any.
    pub fn identity(&self) -> Option<Identity> {
        self.0
            .with(|store| store.session().map(|session| session.user().clone()))
    }

    pub fn login(&self, identity: Identity, role: Role, token: Option<String>) {
        self.0.update(|store| store.login(identity, role, token));
    }

    pub fn logout(&self) {
        self.0.update(SessionStore::logout);
    }

    pub fn update_user(&self, patch: IdentityPatch) {
        self.0.update(|store| store.update_user(patch));
    }

    pub fn remember_email(&self, email: Option<&str>) {
        self.0.with_untracked(|store| store.remember_email(email));
    }

    pub fn remembered_email(&self) -> Option<String> {
        self.0.with_untracked(SessionStore::remembered_email)
    }
}

/// Creates the session store, provides it through context, and schedules
/// rehydration once the app is running in the browser.
pub fn provide_session() -> SessionContext {
    let store = RwSignal::new(SessionStore::new(BrowserStorage, SessionPolicy::default()));
    let context = SessionContext(store);
    provide_context(context);

    Effect::new(move || {
        spawn_local(async move {
            let policy = match session_max_age_hours().await {
                Ok(hours) => SessionPolicy::from_hours(hours).unwrap_or_else(|| {
                    tracing::warn!(hours, "Ignoring out-of-range session lifetime");
                    SessionPolicy::default()
                }),
                Err(e) => {
                    tracing::warn!(error = %e, "Using default session lifetime");
                    SessionPolicy::default()
                }
            };
            let mut rehydrated = SessionStore::new(BrowserStorage, policy);
            rehydrated.rehydrate();
            store.set(rehydrated);
        });
    });

    context
}

/// Returns the session provided by [`provide_session`].
pub fn use_session() -> SessionContext {
    expect_context::<SessionContext>()
}
