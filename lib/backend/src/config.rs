//! Connection settings for the hosted backend.

use serde::{Deserialize, Serialize};

/// Configuration for the hosted backend-as-a-service.
///
/// The key is the project's static published key; requests are not made on
/// behalf of individual users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Project URL, e.g. "https://abcd.supabase.co".
    pub url: String,
    /// Static published API key.
    pub anon_key: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
    10
}

impl BackendConfig {
    /// Creates a configuration with the default timeout.
    #[must_use]
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
            timeout_seconds: default_timeout_seconds(),
        }
    }

    /// Returns the REST endpoint for a table.
    #[must_use]
    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url.trim_end_matches('/'), table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_defaults_when_missing() {
        let config: BackendConfig =
            serde_json::from_str(r#"{"url":"https://x.example","anon_key":"k"}"#)
                .expect("deserialize");
        assert_eq!(config.timeout_seconds, 10);
    }

    #[test]
    fn table_url_strips_trailing_slash() {
        let config = BackendConfig::new("https://x.example/", "k");
        assert_eq!(
            config.table_url("patients"),
            "https://x.example/rest/v1/patients"
        );
    }
}
