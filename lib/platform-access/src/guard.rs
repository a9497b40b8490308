//! Route guards: deciding whether a page may render for the current session.
//!
//! A guard never partially renders. While the session is still being
//! rehydrated every route shows a neutral placeholder, so a page load does not
//! bounce through the login page before the stored session has been read.

use crate::role::AllowedRoles;
use crate::store::SessionState;

/// Where unauthenticated visitors are sent.
pub const LOGIN_PATH: &str = "/login";

/// Where authenticated sessions land after login or a disallowed route.
///
/// Every authenticated role may view it, so a role redirect cannot loop.
pub const DEFAULT_LANDING_PATH: &str = "/dashboard";

/// Access rule attached to a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Only visitors without a session (login, signup).
    Public,
    /// Only sessions whose role is in the allow-list.
    Protected(AllowedRoles),
}

/// What a guarded route should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session not yet known; show a neutral placeholder.
    Placeholder,
    /// Render the route's page.
    Render,
    /// Navigate elsewhere without rendering the page.
    Redirect(&'static str),
}

/// Decides whether a route with the given access rule may render.
#[must_use]
pub fn decide(access: &Access, state: &SessionState) -> GuardDecision {
    if state.is_loading() {
        return GuardDecision::Placeholder;
    }

    match (access, state.session()) {
        (Access::Protected(_), None) => GuardDecision::Redirect(LOGIN_PATH),
        (Access::Protected(allowed), Some(session)) => {
            if allowed.permits(session.role()) {
                GuardDecision::Render
            } else {
                GuardDecision::Redirect(DEFAULT_LANDING_PATH)
            }
        }
        (Access::Public, None) => GuardDecision::Render,
        (Access::Public, Some(_)) => GuardDecision::Redirect(DEFAULT_LANDING_PATH),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Identity;
    use crate::role::Role;
    use crate::session::Session;
    use medicare_core::RecordId;

    fn active(role: Role) -> SessionState {
        let identity = Identity::new(RecordId::new("1"), "user@demo.com", "User");
        SessionState::Active(Session::new(identity, role, None))
    }

    fn protected(roles: &[Role]) -> Access {
        Access::Protected(AllowedRoles::new(roles.iter().copied()).expect("valid allow-list"))
    }

    #[test]
    fn loading_renders_placeholder_everywhere() {
        assert_eq!(
            decide(&protected(&[Role::Admin]), &SessionState::Loading),
            GuardDecision::Placeholder
        );
        assert_eq!(
            decide(&Access::Public, &SessionState::Loading),
            GuardDecision::Placeholder
        );
    }

    #[test]
    fn protected_without_session_redirects_to_login() {
        for roles in [
            vec![Role::Patient],
            vec![Role::Doctor, Role::Admin],
            Role::AUTHENTICATED.to_vec(),
        ] {
            assert_eq!(
                decide(&protected(&roles), &SessionState::Cleared),
                GuardDecision::Redirect(LOGIN_PATH)
            );
        }
    }

    #[test]
    fn protected_renders_iff_role_allowed() {
        let allow_lists = [
            vec![Role::Patient],
            vec![Role::Doctor],
            vec![Role::Admin],
            vec![Role::Doctor, Role::Admin],
            vec![Role::Patient, Role::Admin],
            Role::AUTHENTICATED.to_vec(),
        ];

        for roles in &allow_lists {
            let access = protected(roles);
            for role in Role::AUTHENTICATED {
                let expected = if roles.contains(&role) {
                    GuardDecision::Render
                } else {
                    GuardDecision::Redirect(DEFAULT_LANDING_PATH)
                };
                assert_eq!(decide(&access, &active(role)), expected, "{role} in {roles:?}");
            }
        }
    }

    #[test]
    fn public_renders_without_session() {
        assert_eq!(
            decide(&Access::Public, &SessionState::Cleared),
            GuardDecision::Render
        );
    }

    #[test]
    fn public_redirects_authenticated_sessions_to_landing() {
        for role in Role::AUTHENTICATED {
            assert_eq!(
                decide(&Access::Public, &active(role)),
                GuardDecision::Redirect(DEFAULT_LANDING_PATH)
            );
        }
    }
}
