//! The application's route table.
//!
//! Each route pairs a path pattern with an [`Access`] rule. Patterns are
//! absolute paths whose segments are either literals or `:name` parameters.

use crate::error::RouteError;
use crate::guard::{Access, DEFAULT_LANDING_PATH, LOGIN_PATH};
use crate::role::{AllowedRoles, Role};
use medicare_core::Result;

/// A path pattern paired with its access rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    pattern: String,
    segments: Vec<Segment>,
    access: Access,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param,
}

impl RouteDescriptor {
    /// Parses a pattern and attaches an access rule.
    ///
    /// # Errors
    ///
    /// Returns `RouteError::InvalidPattern` if the pattern is not absolute,
    /// has empty segments, or has an unnamed parameter.
    pub fn new(pattern: &str, access: Access) -> Result<Self, RouteError> {
        let invalid = |reason: &str| RouteError::InvalidPattern {
            path: pattern.to_string(),
            reason: reason.to_string(),
        };

        let Some(rest) = pattern.strip_prefix('/') else {
            return Err(invalid("must start with '/'").into());
        };

        let mut segments = Vec::new();
        if !rest.is_empty() {
            for part in rest.split('/') {
                if part.is_empty() {
                    return Err(invalid("empty segment").into());
                }
                match part.strip_prefix(':') {
                    Some("") => return Err(invalid("parameter without a name").into()),
                    Some(_) => segments.push(Segment::Param),
                    None => segments.push(Segment::Literal(part.to_string())),
                }
            }
        }

        Ok(Self {
            pattern: pattern.to_string(),
            segments,
            access,
        })
    }

    /// Returns the path pattern as declared.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the access rule.
    #[must_use]
    pub fn access(&self) -> &Access {
        &self.access
    }

    /// Returns true if `path` matches this pattern.
    ///
    /// Query strings, fragments, and one trailing slash are ignored.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let Some(rest) = path.strip_prefix('/') else {
            return false;
        };
        let rest = rest.strip_suffix('/').unwrap_or(rest);
        let parts: Vec<&str> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('/').collect()
        };

        parts.len() == self.segments.len()
            && self
                .segments
                .iter()
                .zip(parts)
                .all(|(segment, part)| match segment {
                    Segment::Literal(literal) => literal == part,
                    Segment::Param => !part.is_empty(),
                })
    }
}

/// The full set of guarded routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
}

impl RouteTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a route.
    ///
    /// # Errors
    ///
    /// Returns `RouteError::DuplicatePath` if the pattern is already declared.
    pub fn add(&mut self, route: RouteDescriptor) -> Result<(), RouteError> {
        if self.routes.iter().any(|r| r.pattern == route.pattern) {
            return Err(RouteError::DuplicatePath {
                path: route.pattern,
            }
            .into());
        }
        self.routes.push(route);
        Ok(())
    }

    /// Adds a public route.
    ///
    /// # Errors
    ///
    /// See [`RouteDescriptor::new`] and [`RouteTable::add`].
    pub fn public(&mut self, pattern: &str) -> Result<(), RouteError> {
        self.add(RouteDescriptor::new(pattern, Access::Public)?)
    }

    /// Adds a route restricted to the given roles.
    ///
    /// # Errors
    ///
    /// See [`AllowedRoles::new`], [`RouteDescriptor::new`], and [`RouteTable::add`].
    pub fn protected(
        &mut self,
        pattern: &str,
        roles: impl IntoIterator<Item = Role>,
    ) -> Result<(), RouteError> {
        let allowed = AllowedRoles::new(roles)?;
        self.add(RouteDescriptor::new(pattern, Access::Protected(allowed))?)
    }

    /// Builds the clinic's route table.
    ///
    /// # Errors
    ///
    /// Only fails if the declarations below are edited into an invalid state.
    pub fn clinic() -> Result<Self, RouteError> {
        use Role::{Admin, Doctor, Patient};

        let mut table = Self::new();
        table.public(LOGIN_PATH)?;
        table.public("/signup")?;
        table.protected(DEFAULT_LANDING_PATH, Role::AUTHENTICATED)?;
        table.protected("/profile", Role::AUTHENTICATED)?;
        table.protected("/appointments", [Patient, Doctor, Admin])?;
        table.protected("/prescriptions", [Patient, Doctor, Admin])?;
        table.protected("/payments", [Patient, Admin])?;
        table.protected("/doctors", [Patient, Admin])?;
        table.protected("/medicines", [Doctor, Admin])?;
        table.protected("/patients", [Doctor, Admin])?;
        table.protected("/patients/:id/history", [Doctor, Admin])?;
        table.protected("/history", [Patient])?;
        Ok(table)
    }

    /// Returns the access rule of the first route matching `path`.
    #[must_use]
    pub fn access_for(&self, path: &str) -> Option<&Access> {
        self.routes
            .iter()
            .find(|route| route.matches(path))
            .map(RouteDescriptor::access)
    }

    /// Returns the routes a role may navigate to, in declaration order.
    ///
    /// Used to build role-specific navigation menus.
    pub fn visible_to(&self, role: Role) -> impl Iterator<Item = &RouteDescriptor> {
        self.routes.iter().filter(move |route| match route.access() {
            Access::Public => !role.is_authenticated(),
            Access::Protected(allowed) => allowed.permits(role),
        })
    }

    /// Returns every declared route.
    #[must_use]
    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::{GuardDecision, decide};
    use crate::store::SessionState;

    fn clinic() -> RouteTable {
        RouteTable::clinic().expect("clinic table is valid")
    }

    #[test]
    fn every_protected_route_has_roles() {
        for route in clinic().routes() {
            if let Access::Protected(allowed) = route.access() {
                assert!(!allowed.roles().is_empty(), "{}", route.pattern());
            }
        }
    }

    #[test]
    fn landing_path_admits_every_role() {
        let table = clinic();
        let access = table.access_for(DEFAULT_LANDING_PATH).expect("declared");
        let Access::Protected(allowed) = access else {
            panic!("landing path must be protected");
        };
        for role in Role::AUTHENTICATED {
            assert!(allowed.permits(role));
        }
    }

    #[test]
    fn login_and_signup_are_public() {
        let table = clinic();
        assert_eq!(table.access_for("/login"), Some(&Access::Public));
        assert_eq!(table.access_for("/signup"), Some(&Access::Public));
    }

    #[test]
    fn parameter_segments_match() {
        let table = clinic();
        assert!(table.access_for("/patients/42/history").is_some());
        assert!(table.access_for("/patients/42").is_none());
        assert!(table.access_for("/patients//history").is_none());
    }

    #[test]
    fn query_and_trailing_slash_are_ignored() {
        let table = clinic();
        assert!(table.access_for("/appointments/?page=2").is_some());
        assert!(table.access_for("/doctors#top").is_some());
    }

    #[test]
    fn unknown_paths_have_no_access_rule() {
        assert!(clinic().access_for("/billing").is_none());
        assert!(clinic().access_for("relative").is_none());
    }

    #[test]
    fn duplicate_patterns_are_rejected() {
        let mut table = RouteTable::new();
        table.public("/login").expect("first declaration");
        assert!(table.public("/login").is_err());
    }

    #[test]
    fn empty_allow_list_is_rejected() {
        let mut table = RouteTable::new();
        assert!(table.protected("/empty", Vec::<Role>::new()).is_err());
        assert!(table.routes().is_empty());
    }

    #[test]
    fn malformed_patterns_are_rejected() {
        for pattern in ["doctors", "/a//b", "/patients/:"] {
            assert!(
                RouteDescriptor::new(pattern, Access::Public).is_err(),
                "{pattern}"
            );
        }
    }

    #[test]
    fn visible_routes_follow_allow_lists() {
        let table = clinic();
        let patient: Vec<&str> = table
            .visible_to(Role::Patient)
            .map(RouteDescriptor::pattern)
            .collect();
        assert!(patient.contains(&"/history"));
        assert!(!patient.contains(&"/medicines"));
        assert!(!patient.contains(&"/login"));

        let guest: Vec<&str> = table
            .visible_to(Role::Guest)
            .map(RouteDescriptor::pattern)
            .collect();
        assert_eq!(guest, vec!["/login", "/signup"]);
    }

    #[test]
    fn doctor_is_sent_home_from_payments() {
        let table = clinic();
        let identity = crate::identity::Identity::new(
            medicare_core::RecordId::new("d"),
            "doctor@demo.com",
            "Doc",
        );
        let state =
            SessionState::Active(crate::session::Session::new(identity, Role::Doctor, None));
        let access = table.access_for("/payments").expect("declared");
        assert_eq!(
            decide(access, &state),
            GuardDecision::Redirect(DEFAULT_LANDING_PATH)
        );
    }
}
