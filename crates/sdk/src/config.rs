//! Configuration types for the kintone SDK.

use crate::auth::AuthContext;
use std::time::Duration;
use url::Url;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the kintone client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL, normally `https://{domain}`.
    pub base_url: Url,
    /// Resolved authentication.
    pub auth: AuthContext,
    /// Timeout applied to every request the client issues.
    pub timeout: Duration,
    /// User-Agent sent with each request.
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a configuration pointing at the auth context's own domain.
    pub fn new(auth: AuthContext) -> Result<Self, url::ParseError> {
        let base_url = Url::parse(&auth.base_url())?;
        Ok(Self {
            base_url,
            auth,
            timeout: DEFAULT_TIMEOUT,
            user_agent: default_user_agent(),
        })
    }
}

pub(crate) fn default_user_agent() -> String {
    format!("kintone-sdk-rust/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credentials;

    #[test]
    fn test_client_config_new() {
        let auth = AuthContext::new("example.cybozu.com", &Credentials::api_tokens("tok")).unwrap();
        let config = ClientConfig::new(auth).unwrap();

        assert_eq!(config.base_url.as_str(), "https://example.cybozu.com/");
        assert_eq!(config.base_url.host_str(), Some("example.cybozu.com"));
    }

    #[test]
    fn test_client_config_defaults() {
        let auth = AuthContext::new("example.cybozu.com", &Credentials::api_tokens("tok")).unwrap();
        let config = ClientConfig::new(auth).unwrap();

        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("kintone-sdk-rust/"));
    }
}
