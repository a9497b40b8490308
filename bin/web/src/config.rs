//! Centralized server configuration.
//!
//! Loaded via the `config` crate from environment variables, e.g.
//! `BACKEND__URL`, `BACKEND__ANON_KEY`, `SESSION__MAX_AGE_HOURS`.
//!
//! See [`BackendConfig`] for the hosted backend settings.

use medicare_backend::BackendConfig;
use medicare_platform_access::SessionPolicy;
use serde::Deserialize;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Hosted backend. Without it the server uses seeded in-memory tables.
    #[serde(default)]
    pub backend: Option<BackendConfig>,

    /// Session configuration.
    #[serde(default)]
    pub session: SessionConfig,
}

/// Session-related configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SessionConfig {
    /// Age in hours after which a stored session is discarded.
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: i64,
}

fn default_max_age_hours() -> i64 {
    SessionPolicy::DEFAULT_MAX_AGE_HOURS
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_age_hours: default_max_age_hours(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is present but invalid, including a
    /// session age outside [`SessionPolicy::MAX_AGE_HOURS_RANGE`].
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_source(
            config::Environment::default()
                .separator("__")
                .try_parsing(true),
        )
    }

    fn from_source(
        source: impl config::Source + Send + Sync + 'static,
    ) -> Result<Self, config::ConfigError> {
        let config: Self = config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?;
        config.session.policy()?;
        Ok(config)
    }
}

impl SessionConfig {
    /// Returns the session policy for the configured age.
    ///
    /// # Errors
    ///
    /// Returns an error if the age is outside
    /// [`SessionPolicy::MAX_AGE_HOURS_RANGE`].
    pub fn policy(&self) -> Result<SessionPolicy, config::ConfigError> {
        SessionPolicy::from_hours(self.max_age_hours).ok_or_else(|| {
            let range = SessionPolicy::MAX_AGE_HOURS_RANGE;
            config::ConfigError::Message(format!(
                "session.max_age_hours must be between {} and {}, got {}",
                range.start(),
                range.end(),
                self.max_age_hours
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_vars(vars: &[(&str, &str)]) -> Result<ServerConfig, config::ConfigError> {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_source(
            config::Environment::default()
                .separator("__")
                .try_parsing(true)
                .source(Some(source)),
        )
    }

    #[test]
    fn session_config_has_correct_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.max_age_hours, 24);
    }

    #[test]
    fn empty_environment_uses_memory_backend() {
        let config = from_vars(&[]).expect("config");
        assert!(config.backend.is_none());
        assert_eq!(config.session.max_age_hours, 24);
    }

    #[test]
    fn reads_nested_backend_settings() {
        let config = from_vars(&[
            ("BACKEND__URL", "https://clinic.example.com"),
            ("BACKEND__ANON_KEY", "published-key"),
            ("BACKEND__TIMEOUT_SECONDS", "3"),
            ("SESSION__MAX_AGE_HOURS", "8"),
        ])
        .expect("config");
        let backend = config.backend.expect("backend");
        assert_eq!(backend.url, "https://clinic.example.com");
        assert_eq!(backend.anon_key, "published-key");
        assert_eq!(backend.timeout_seconds, 3);
        assert_eq!(config.session.max_age_hours, 8);
    }

    #[test]
    fn session_age_out_of_range_is_rejected() {
        for hours in ["0", "-1", "9000000000000000"] {
            let err = from_vars(&[("SESSION__MAX_AGE_HOURS", hours)]).expect_err(hours);
            assert!(
                err.to_string().contains("max_age_hours"),
                "{hours}: {err}"
            );
        }
    }

    #[test]
    fn longest_session_age_is_accepted() {
        let config = from_vars(&[("SESSION__MAX_AGE_HOURS", "8760")]).expect("config");
        assert_eq!(config.session.policy().expect("policy").max_age().num_hours(), 8760);
    }
}
