//! The client-held session record.
//!
//! A session is created on successful login and persisted as a single JSON
//! document. It carries the identity, the role alongside it, the time it was
//! issued, and an optional opaque bearer token.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::identity::{Identity, IdentityPatch};
use crate::role::Role;

/// How long a session survives after issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    max_age: Duration,
}

impl SessionPolicy {
    /// Sessions expire this many hours after login.
    pub const DEFAULT_MAX_AGE_HOURS: i64 = 24;

    /// Accepted maximum ages, in hours: one hour up to one year.
    pub const MAX_AGE_HOURS_RANGE: RangeInclusive<i64> = 1..=8760;

    /// Creates a policy with the given maximum session age.
    #[must_use]
    pub fn new(max_age: Duration) -> Self {
        Self { max_age }
    }

    /// Creates a policy from a configured age in hours.
    ///
    /// Returns `None` outside [`Self::MAX_AGE_HOURS_RANGE`]; a zero or
    /// negative age would expire every session on reload.
    #[must_use]
    pub fn from_hours(hours: i64) -> Option<Self> {
        if !Self::MAX_AGE_HOURS_RANGE.contains(&hours) {
            return None;
        }
        Duration::try_hours(hours).map(Self::new)
    }

    /// Returns the maximum session age.
    #[must_use]
    pub fn max_age(&self) -> Duration {
        self.max_age
    }
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self::new(Duration::hours(Self::DEFAULT_MAX_AGE_HOURS))
    }
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The logged-in identity.
    user: Identity,
    /// The role chosen at login.
    role: Role,
    /// When the session was issued.
    issued_at: DateTime<Utc>,
    /// Opaque bearer token handed out at login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

impl Session {
    /// Creates a session issued now.
    #[must_use]
    pub fn new(user: Identity, role: Role, token: Option<String>) -> Self {
        Self::issued_at(user, role, token, Utc::now())
    }

    /// Creates a session with an explicit issuance time.
    #[must_use]
    pub fn issued_at(
        user: Identity,
        role: Role,
        token: Option<String>,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user,
            role,
            issued_at,
            token,
        }
    }

    /// Returns the logged-in identity.
    #[must_use]
    pub fn user(&self) -> &Identity {
        &self.user
    }

    /// Returns the session's role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns when the session was issued.
    #[must_use]
    pub fn issued(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Returns the bearer token, if one was issued.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Returns true if the session is older than the policy allows at `now`.
    #[must_use]
    pub fn is_expired_at(&self, policy: &SessionPolicy, now: DateTime<Utc>) -> bool {
        now - self.issued_at > policy.max_age()
    }

    /// Merges a partial identity update.
    pub fn update_user(&mut self, patch: IdentityPatch) {
        self.user.apply(patch);
    }
}
