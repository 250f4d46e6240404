//! Credential resolution and request authentication.
//!
//! kintone accepts either one to nine API tokens or a login name and
//! password. Nothing here talks to the network; bad credentials surface on
//! the first real request as [`KintoneError::Authentication`].

use crate::error::{KintoneError, KintoneResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::fmt;

pub const API_TOKEN_HEADER: &str = "X-Cybozu-API-Token";
pub const PASSWORD_HEADER: &str = "X-Cybozu-Authorization";

/// Maximum number of API tokens kintone accepts in one header.
pub const MAX_API_TOKENS: usize = 9;

/// Raw credentials as supplied by configuration.
#[derive(Clone, Default)]
pub struct Credentials {
    pub api_tokens: Vec<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    /// Credentials from a comma-separated token list such as `"t1,t2"`.
    pub fn api_tokens(tokens: &str) -> Self {
        Self {
            api_tokens: split_tokens(tokens),
            ..Default::default()
        }
    }

    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
            ..Default::default()
        }
    }

    fn has_password(&self) -> bool {
        non_empty(&self.username) && non_empty(&self.password)
    }

    fn tokens(&self) -> Vec<String> {
        self.api_tokens
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_tokens", &format_args!("[{} redacted]", self.api_tokens.len()))
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Split a comma-separated token list, dropping blanks.
pub fn split_tokens(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthType {
    ApiToken,
    Password,
}

/// Pick the auth scheme. Password wins when both are complete.
pub fn resolve_auth_type(credentials: &Credentials) -> KintoneResult<AuthType> {
    if credentials.has_password() {
        Ok(AuthType::Password)
    } else if !credentials.tokens().is_empty() {
        Ok(AuthType::ApiToken)
    } else {
        Err(KintoneError::Config(
            "no valid credentials supplied: provide username and password, or an API token"
                .to_string(),
        ))
    }
}

/// A resolved authentication scheme.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    ApiToken(Vec<String>),
    Password { username: String, password: String },
}

impl Auth {
    pub fn from_credentials(credentials: &Credentials) -> KintoneResult<Self> {
        match resolve_auth_type(credentials)? {
            AuthType::Password => Ok(Self::Password {
                username: credentials.username.clone().unwrap_or_default(),
                password: credentials.password.clone().unwrap_or_default(),
            }),
            AuthType::ApiToken => {
                let tokens = credentials.tokens();
                if tokens.len() > MAX_API_TOKENS {
                    return Err(KintoneError::validation(format!(
                        "at most {} API tokens may be supplied, got {}",
                        MAX_API_TOKENS,
                        tokens.len()
                    )));
                }
                Ok(Self::ApiToken(tokens))
            }
        }
    }

    pub fn auth_type(&self) -> AuthType {
        match self {
            Self::ApiToken(_) => AuthType::ApiToken,
            Self::Password { .. } => AuthType::Password,
        }
    }

    /// The header name and value that authenticate a request.
    pub fn header(&self) -> (&'static str, String) {
        match self {
            Self::ApiToken(tokens) => (API_TOKEN_HEADER, tokens.join(",")),
            Self::Password { username, password } => (
                PASSWORD_HEADER,
                STANDARD.encode(format!("{}:{}", username, password)),
            ),
        }
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiToken(tokens) => f
                .debug_tuple("ApiToken")
                .field(&format_args!("[{} redacted]", tokens.len()))
                .finish(),
            Self::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// Auth scheme bound to a kintone domain. Built once, then shared.
#[derive(Debug, Clone)]
pub struct AuthContext {
    domain: String,
    auth: Auth,
}

impl AuthContext {
    pub fn new(domain: &str, credentials: &Credentials) -> KintoneResult<Self> {
        let domain = normalize_domain(domain)?;
        let auth = Auth::from_credentials(credentials)?;
        Ok(Self { domain, auth })
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// `https://{domain}` with no trailing slash.
    pub fn base_url(&self) -> String {
        format!("https://{}", self.domain)
    }

    /// Headers attached to every request.
    pub fn headers(&self) -> KintoneResult<HeaderMap> {
        let (name, value) = self.auth.header();
        let invalid = || {
            KintoneError::Config("credentials contain characters not allowed in a header".to_string())
        };
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?,
            HeaderValue::from_str(&value).map_err(|_| invalid())?,
        );
        Ok(headers)
    }
}

/// Trim, drop any `scheme://` prefix and trailing slashes.
pub fn normalize_domain(raw: &str) -> KintoneResult<String> {
    let trimmed = raw.trim();
    let without_scheme = match trimmed.find("://") {
        Some(idx) => &trimmed[idx + 3..],
        None => trimmed,
    };
    let domain = without_scheme.trim_end_matches('/');
    if domain.is_empty() {
        return Err(KintoneError::Config("domain cannot be empty".to_string()));
    }
    Ok(domain.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn both() -> Credentials {
        Credentials {
            api_tokens: vec!["tok".to_string()],
            username: Some("alice".to_string()),
            password: Some("secret".to_string()),
        }
    }

    #[test]
    fn test_token_only_selects_token_auth() {
        let creds = Credentials::api_tokens("tok");
        assert_eq!(resolve_auth_type(&creds).unwrap(), AuthType::ApiToken);
    }

    #[test]
    fn test_password_only_selects_password_auth() {
        let creds = Credentials::password("alice", "secret");
        assert_eq!(resolve_auth_type(&creds).unwrap(), AuthType::Password);
    }

    #[test]
    fn test_both_prefers_password() {
        assert_eq!(resolve_auth_type(&both()).unwrap(), AuthType::Password);
    }

    #[test]
    fn test_neither_is_config_error() {
        let err = resolve_auth_type(&Credentials::default()).unwrap_err();
        assert!(matches!(err, KintoneError::Config(_)));

        // Username without password is incomplete, and so are blank tokens
        let partial = Credentials {
            api_tokens: vec![" ".to_string()],
            username: Some("alice".to_string()),
            password: None,
        };
        assert!(matches!(
            resolve_auth_type(&partial),
            Err(KintoneError::Config(_))
        ));
    }

    #[test]
    fn test_token_count_limit() {
        let nine = (1..=9).map(|i| format!("t{}", i)).collect::<Vec<_>>().join(",");
        let auth = Auth::from_credentials(&Credentials::api_tokens(&nine)).unwrap();
        assert_eq!(auth.header().1, nine);

        let ten = (1..=10).map(|i| format!("t{}", i)).collect::<Vec<_>>().join(",");
        let err = Auth::from_credentials(&Credentials::api_tokens(&ten)).unwrap_err();
        assert!(matches!(err, KintoneError::Validation(_)));
    }

    #[test]
    fn test_token_list_is_trimmed() {
        let creds = Credentials::api_tokens(" a , b,,c ");
        let auth = Auth::from_credentials(&creds).unwrap();
        assert_eq!(auth.header(), (API_TOKEN_HEADER, "a,b,c".to_string()));
    }

    #[test]
    fn test_password_header_round_trips() {
        let auth = Auth::from_credentials(&Credentials::password("alice", "p@ss:word")).unwrap();
        let (name, value) = auth.header();
        assert_eq!(name, PASSWORD_HEADER);

        let decoded = String::from_utf8(STANDARD.decode(value).unwrap()).unwrap();
        assert_eq!(decoded, "alice:p@ss:word");
    }

    #[test]
    fn test_base_url_and_headers() {
        let ctx = AuthContext::new("example.cybozu.com", &Credentials::api_tokens("tok")).unwrap();
        assert_eq!(ctx.base_url(), "https://example.cybozu.com");

        let headers = ctx.headers().unwrap();
        assert_eq!(headers.get("X-Cybozu-API-Token").unwrap(), "tok");
        assert!(headers.get("X-Cybozu-Authorization").is_none());
    }

    #[test]
    fn test_domain_normalization() {
        assert_eq!(normalize_domain("https://foo.cybozu.com/").unwrap(), "foo.cybozu.com");
        assert_eq!(normalize_domain("  foo.kintone.com ").unwrap(), "foo.kintone.com");
        assert!(normalize_domain(" ").is_err());
        assert!(normalize_domain("https://").is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", AuthContext::new("x.cybozu.com", &both()).unwrap());
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("alice"));
    }
}
