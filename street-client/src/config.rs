use std::collections::BTreeMap;
use std::env;

pub const DEFAULT_REFRESH_PATH: &str = "/services/auth/refresh-login-token";

/// Flags each user role switches on or off.
pub type RoleFlags = BTreeMap<String, BTreeMap<String, bool>>;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URI of the REST API, without a trailing slash.
    pub api_url: String,
    /// Full URL of the login-token refresh endpoint.
    pub refresh_url: String,
    /// Read-only clients (phones) never create streets.
    pub read_only: bool,
    pub role_flags: RoleFlags,
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self {
            refresh_url: format!("{}{}", api_url, DEFAULT_REFRESH_PATH),
            api_url,
            read_only: false,
            role_flags: RoleFlags::new(),
        }
    }

    pub fn with_refresh_url(mut self, url: impl Into<String>) -> Self {
        self.refresh_url = url.into();
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn with_role(mut self, role: &str, flags: &[(&str, bool)]) -> Self {
        self.role_flags.insert(
            role.to_string(),
            flags.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        );
        self
    }

    /// Read `STREETMIX_API_URL`, `STREETMIX_REFRESH_URL` and
    /// `STREETMIX_READ_ONLY`, after loading a `.env` file if present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_url = env::var("STREETMIX_API_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());
        let mut config = Self::new(api_url);

        if let Ok(url) = env::var("STREETMIX_REFRESH_URL") {
            config.refresh_url = url;
        }
        config.read_only = env::var("STREETMIX_READ_ONLY")
            .map(|v| matches!(v.as_str(), "1" | "true"))
            .unwrap_or(false);

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash_and_derives_refresh_url() {
        let config = ClientConfig::new("https://streetmix.net/api/");
        assert_eq!(config.api_url, "https://streetmix.net/api");
        assert_eq!(
            config.refresh_url,
            "https://streetmix.net/api/services/auth/refresh-login-token"
        );
        assert!(!config.read_only);
    }

    #[test]
    fn builds_role_table() {
        let config = ClientConfig::new("http://x").with_role("ADMIN", &[("GALLERY", true)]);
        assert_eq!(config.role_flags["ADMIN"]["GALLERY"], true);
    }
}
