//! Role and allow-list types for route access control.
//!
//! Every session carries exactly one role. Routes declare which roles may
//! view them; there are no finer-grained permissions within a role.

use crate::error::RouteError;
use medicare_core::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The role assigned to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A patient viewing their own appointments, prescriptions, and payments.
    Patient,
    /// A doctor managing appointments, prescriptions, and patient history.
    Doctor,
    /// Front-desk administration. Older payloads call this role "receptionist".
    #[serde(alias = "receptionist")]
    Admin,
    /// The role reported when no session exists.
    Guest,
}

impl Role {
    /// Roles that can hold a session.
    pub const AUTHENTICATED: [Role; 3] = [Role::Patient, Role::Doctor, Role::Admin];

    /// Returns the wire name of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Doctor => "doctor",
            Self::Admin => "admin",
            Self::Guest => "guest",
        }
    }

    /// Returns a human-readable label for menus and headings.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Patient => "Patient",
            Self::Doctor => "Doctor",
            Self::Admin => "Admin",
            Self::Guest => "Guest",
        }
    }

    /// Returns true if this role can hold a session.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::Guest)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError {
    pub value: String,
}

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role '{}'", self.value)
    }
}

impl std::error::Error for ParseRoleError {}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patient" => Ok(Self::Patient),
            "doctor" => Ok(Self::Doctor),
            "admin" | "receptionist" => Ok(Self::Admin),
            "guest" => Ok(Self::Guest),
            _ => Err(ParseRoleError {
                value: s.to_string(),
            }),
        }
    }
}

/// The set of roles permitted to view a protected route.
///
/// Always non-empty and never contains [`Role::Guest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedRoles {
    roles: Vec<Role>,
}

impl AllowedRoles {
    /// Creates an allow-list from the given roles.
    ///
    /// Duplicates are collapsed.
    ///
    /// # Errors
    ///
    /// Returns `RouteError::EmptyAllowList` for an empty list and
    /// `RouteError::GuestNotAllowed` if the guest role is listed.
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Result<Self, RouteError> {
        let mut collected = Vec::new();
        for role in roles {
            if !role.is_authenticated() {
                return Err(RouteError::GuestNotAllowed.into());
            }
            if !collected.contains(&role) {
                collected.push(role);
            }
        }
        if collected.is_empty() {
            return Err(RouteError::EmptyAllowList.into());
        }
        Ok(Self { roles: collected })
    }

    /// Returns true if the role may view the route.
    #[must_use]
    pub fn permits(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Returns the roles as a slice.
    #[must_use]
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }
}
