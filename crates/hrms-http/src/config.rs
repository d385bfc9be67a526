//! Session configuration.

use std::time::Duration;

use serde::Deserialize;

use hrms_core::ApiUrl;

/// Default login endpoint, relative to the API base.
pub const DEFAULT_LOGIN_PATH: &str = "/auth/login";

/// Default token refresh endpoint.
pub const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";

/// Default logout endpoint.
pub const DEFAULT_LOGOUT_PATH: &str = "/auth/logout";

/// Default per-request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Configuration for an [`AuthenticatedHttpSession`](crate::AuthenticatedHttpSession).
///
/// Deserializable so it can live in a config file; only `api_url` is required.
///
/// # Example
///
/// ```
/// use hrms_core::ApiUrl;
/// use hrms_http::SessionConfig;
///
/// let config = SessionConfig::new(ApiUrl::new("https://hr.example.com/api").unwrap())
///     .with_refresh_path("/auth/token/refresh")
///     .with_timeout(std::time::Duration::from_secs(10));
/// assert_eq!(config.refresh_path, "/auth/token/refresh");
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub api_url: ApiUrl,
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    #[serde(default = "default_logout_path")]
    pub logout_path: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_login_path() -> String {
    DEFAULT_LOGIN_PATH.to_string()
}

fn default_refresh_path() -> String {
    DEFAULT_REFRESH_PATH.to_string()
}

fn default_logout_path() -> String {
    DEFAULT_LOGOUT_PATH.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_user_agent() -> String {
    concat!("hrms/", env!("CARGO_PKG_VERSION")).to_string()
}

impl SessionConfig {
    pub fn new(api_url: ApiUrl) -> Self {
        Self {
            api_url,
            login_path: default_login_path(),
            refresh_path: default_refresh_path(),
            logout_path: default_logout_path(),
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }

    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    pub fn with_logout_path(mut self, path: impl Into<String>) -> Self {
        self.logout_path = path.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_defaults() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"api_url":"https://hr.example.com/api"}"#).unwrap();
        assert_eq!(config.login_path, DEFAULT_LOGIN_PATH);
        assert_eq!(config.refresh_path, DEFAULT_REFRESH_PATH);
        assert_eq!(config.logout_path, DEFAULT_LOGOUT_PATH);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.user_agent.starts_with("hrms/"));
    }

    #[test]
    fn rejects_insecure_api_url() {
        let result = serde_json::from_str::<SessionConfig>(r#"{"api_url":"http://hr.example.com"}"#);
        assert!(result.is_err());
    }
}
