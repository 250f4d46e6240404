//! Main client for the kintone SDK.

use crate::api::*;
use crate::auth::{split_tokens, AuthContext, Credentials};
use crate::config::{ClientConfig, DEFAULT_TIMEOUT};
use crate::error::{KintoneError, KintoneResult};
use crate::transport::HttpTransport;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Client for one kintone domain.
///
/// Immutable once built. Cloning is cheap and clones share the same
/// connection pool, so one client can serve many concurrent tool calls.
#[derive(Debug, Clone)]
pub struct KintoneClient {
    config: Arc<ClientConfig>,
    pub(crate) http: HttpTransport,
}

impl KintoneClient {
    /// Create a new client builder.
    pub fn builder() -> KintoneClientBuilder {
        KintoneClientBuilder::new()
    }

    /// Create a client from configuration.
    pub fn from_config(config: ClientConfig) -> KintoneResult<Self> {
        let config = Arc::new(config);
        let http = HttpTransport::new(config.clone())?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the records API.
    pub fn records(&self) -> RecordsApi<'_> {
        RecordsApi::new(self)
    }

    /// Get the comments API.
    pub fn comments(&self) -> CommentsApi<'_> {
        CommentsApi::new(self)
    }

    /// Get the process management (status) API.
    pub fn statuses(&self) -> StatusesApi<'_> {
        StatusesApi::new(self)
    }

    /// Get the files API.
    pub fn files(&self) -> FilesApi<'_> {
        FilesApi::new(self)
    }

    /// Get the apps API.
    pub fn apps(&self) -> AppsApi<'_> {
        AppsApi::new(self)
    }
}

/// Builder for creating a KintoneClient.
#[derive(Debug)]
pub struct KintoneClientBuilder {
    domain: Option<String>,
    credentials: Credentials,
    base_url: Option<String>,
    timeout: Duration,
    user_agent: Option<String>,
}

impl KintoneClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            domain: None,
            credentials: Credentials::default(),
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }

    /// Set the kintone domain, e.g. `example.cybozu.com`.
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Add API tokens from a comma-separated list.
    pub fn api_token(mut self, tokens: &str) -> Self {
        self.credentials.api_tokens.extend(split_tokens(tokens));
        self
    }

    /// Add API tokens one by one.
    pub fn api_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.credentials
            .api_tokens
            .extend(tokens.into_iter().map(Into::into));
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.credentials.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.credentials.password = Some(password.into());
        self
    }

    /// Replace all credentials at once.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Send requests somewhere other than `https://{domain}`.
    ///
    /// Meant for proxies and test servers; auth is still bound to the domain.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> KintoneResult<KintoneClient> {
        let domain = self
            .domain
            .ok_or_else(|| KintoneError::Config("domain is required".to_string()))?;
        if self.timeout.is_zero() {
            return Err(KintoneError::Config("timeout must be greater than zero".to_string()));
        }

        let auth = AuthContext::new(&domain, &self.credentials)?;
        let mut config = ClientConfig::new(auth)
            .map_err(|e| KintoneError::Config(format!("Invalid domain {}: {}", domain, e)))?;

        if let Some(raw) = self.base_url {
            config.base_url = parse_base_url(&raw)?;
        }
        config.timeout = self.timeout;
        if let Some(user_agent) = self.user_agent {
            config.user_agent = user_agent;
        }

        tracing::debug!(
            domain = config.auth.domain(),
            auth = ?config.auth.auth().auth_type(),
            base_url = %config.base_url,
            "building kintone client"
        );
        KintoneClient::from_config(config)
    }
}

impl Default for KintoneClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an override base URL, keeping any path prefix joinable.
fn parse_base_url(raw: &str) -> KintoneResult<Url> {
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    Url::parse(&with_slash)
        .map_err(|e| KintoneError::Config(format!("Invalid base URL {}: {}", raw, e)))
}
