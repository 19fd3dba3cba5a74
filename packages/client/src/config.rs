//! Client configuration, populated from environment variables.

use std::time::Duration;

use community_groups_api::codes;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Runtime configuration for the API client.
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `GROUP_API_URL` | `http://localhost:3000/` | Service root |
/// | `GROUP_API_VERSION` | `v1` | API version path segment |
/// | `GROUP_API_TIMEOUT_MS` | `5000` | Per-request timeout |
/// | `GROUP_API_MAINTENANCE_CODE` | `api.maintenance` | Body `code` that signals maintenance mode |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Scheme and host of the backend, e.g. `"https://api.example.com/"`.
    pub service_root: String,

    pub api_version: String,

    pub timeout: Duration,

    pub maintenance_code: String,
}

impl ClientConfig {
    /// A config pointing at `service_root` with every other field defaulted.
    pub fn new(service_root: impl Into<String>) -> Self {
        Self {
            service_root: service_root.into(),
            api_version: "v1".into(),
            timeout: DEFAULT_TIMEOUT,
            maintenance_code: codes::MAINTENANCE.into(),
        }
    }

    /// Populate config from environment variables, applying defaults where
    /// absent or unparsable.
    pub fn from_env() -> Self {
        let mut config = Self::new(
            std::env::var("GROUP_API_URL").unwrap_or_else(|_| "http://localhost:3000/".into()),
        );
        if let Ok(v) = std::env::var("GROUP_API_VERSION") {
            config.api_version = v;
        }
        if let Some(ms) = std::env::var("GROUP_API_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            config.timeout = Duration::from_millis(ms);
        }
        if let Ok(code) = std::env::var("GROUP_API_MAINTENANCE_CODE") {
            config.maintenance_code = code;
        }
        config
    }

    /// `{root}/{version}/group/`, the prefix every resource path hangs off.
    pub fn group_api_base(&self) -> String {
        format!(
            "{}/{}/group/",
            self.service_root.trim_end_matches('/'),
            self.api_version.trim_matches('/')
        )
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:3000/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_api_base_normalises_slashes() {
        let mut c = ClientConfig::new("https://api.example.com/");
        assert_eq!(c.group_api_base(), "https://api.example.com/v1/group/");
        c.service_root = "https://api.example.com".into();
        c.api_version = "/v2/".into();
        assert_eq!(c.group_api_base(), "https://api.example.com/v2/group/");
    }

    #[test]
    fn defaults() {
        let c = ClientConfig::default();
        assert_eq!(c.timeout, Duration::from_secs(5));
        assert_eq!(c.maintenance_code, "api.maintenance");
    }
}
