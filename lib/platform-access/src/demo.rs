//! Demo authentication against a fixed directory of accounts.
//!
//! There is no real credential check behind the login form: three demo
//! accounts, one per role, share a single password. The selected role must
//! match the account's role.

use crate::error::AuthenticationError;
use crate::identity::Identity;
use crate::role::Role;
use medicare_core::{RecordId, Result};
use tracing::{debug, info};
use ulid::Ulid;

/// Password shared by every demo account.
pub const DEMO_PASSWORD: &str = "demo123";

/// A demo account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoAccount {
    pub email: &'static str,
    pub role: Role,
    identity: Identity,
}

/// A successful demo login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoLogin {
    pub identity: Identity,
    pub role: Role,
    pub token: String,
}

/// The fixed set of demo accounts.
#[derive(Debug, Clone)]
pub struct DemoDirectory {
    accounts: Vec<DemoAccount>,
}

impl DemoDirectory {
    /// Builds the directory with one account per authenticated role.
    #[must_use]
    pub fn new() -> Self {
        let accounts = vec![
            DemoAccount {
                email: "patient@demo.com",
                role: Role::Patient,
                identity: Identity::new(
                    RecordId::new("demo-patient"),
                    "patient@demo.com",
                    "Pat Demo",
                )
                .with_phone(Some("555-0100".to_string())),
            },
            DemoAccount {
                email: "doctor@demo.com",
                role: Role::Doctor,
                identity: Identity::new(
                    RecordId::new("demo-doctor"),
                    "doctor@demo.com",
                    "Dr. Dana Demo",
                )
                .with_specialty(Some("General Medicine".to_string()))
                .with_department(Some("Outpatient".to_string())),
            },
            DemoAccount {
                email: "admin@demo.com",
                role: Role::Admin,
                identity: Identity::new(RecordId::new("demo-admin"), "admin@demo.com", "Alex Admin")
                    .with_department(Some("Front Desk".to_string())),
            },
        ];
        Self { accounts }
    }

    /// Returns the accounts, for display on the login page.
    #[must_use]
    pub fn accounts(&self) -> &[DemoAccount] {
        &self.accounts
    }

    /// Checks an email/password/role triple against the directory.
    ///
    /// Email matching ignores surrounding whitespace and ASCII case.
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationError::InvalidCredentials` for an unknown email,
    /// a wrong password, or a role that does not match the account.
    pub fn authenticate(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<DemoLogin, AuthenticationError> {
        let email = email.trim();
        let account = self
            .accounts
            .iter()
            .find(|account| account.email.eq_ignore_ascii_case(email))
            .filter(|account| password == DEMO_PASSWORD && account.role == role)
            .ok_or_else(|| {
                debug!(role = %role, "demo login rejected");
                AuthenticationError::InvalidCredentials
            })?;

        info!(role = %role, "demo login accepted");
        Ok(DemoLogin {
            identity: account.identity.clone(),
            role: account.role,
            token: format!("demo.{}", Ulid::new()),
        })
    }
}

impl Default for DemoDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_account_per_role() {
        let directory = DemoDirectory::new();
        for role in Role::AUTHENTICATED {
            assert_eq!(
                directory.accounts().iter().filter(|a| a.role == role).count(),
                1
            );
        }
    }

    #[test]
    fn patient_login_succeeds() {
        let login = DemoDirectory::new()
            .authenticate("patient@demo.com", "demo123", Role::Patient)
            .expect("valid credentials");
        assert_eq!(login.role, Role::Patient);
        assert_eq!(login.identity.email(), "patient@demo.com");
        assert!(login.token.starts_with("demo."));
    }

    #[test]
    fn role_mismatch_fails() {
        let result = DemoDirectory::new().authenticate("patient@demo.com", "demo123", Role::Doctor);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("invalid credentials"));
    }

    #[test]
    fn wrong_password_fails_with_same_message() {
        let wrong_password = DemoDirectory::new()
            .authenticate("patient@demo.com", "hunter2", Role::Patient)
            .unwrap_err()
            .to_string();
        let wrong_role = DemoDirectory::new()
            .authenticate("patient@demo.com", "demo123", Role::Admin)
            .unwrap_err()
            .to_string();
        assert_eq!(wrong_password, wrong_role);
    }

    #[test]
    fn unknown_email_fails() {
        assert!(
            DemoDirectory::new()
                .authenticate("nobody@demo.com", "demo123", Role::Patient)
                .is_err()
        );
    }

    #[test]
    fn guest_role_never_authenticates() {
        for account in DemoDirectory::new().accounts() {
            assert!(
                DemoDirectory::new()
                    .authenticate(account.email, DEMO_PASSWORD, Role::Guest)
                    .is_err()
            );
        }
    }

    #[test]
    fn email_match_ignores_case_and_whitespace() {
        let login = DemoDirectory::new()
            .authenticate("  Doctor@Demo.com ", "demo123", Role::Doctor)
            .expect("valid credentials");
        assert_eq!(login.identity.specialty(), Some("General Medicine"));
    }

    #[test]
    fn tokens_are_fresh_per_login() {
        let directory = DemoDirectory::new();
        let first = directory
            .authenticate("admin@demo.com", "demo123", Role::Admin)
            .expect("valid");
        let second = directory
            .authenticate("admin@demo.com", "demo123", Role::Admin)
            .expect("valid");
        assert_ne!(first.token, second.token);
    }
}
