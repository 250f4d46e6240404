// Server settings: CLI flags and KINTONE_* env vars over an optional TOML file

use clap::Parser;
use kintone_sdk::auth::normalize_domain;
use kintone_sdk::{resolve_auth_type, AuthType, Credentials, KintoneClient, KintoneError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Parser, Debug, Default)]
#[command(name = "kintone-mcp", version)]
#[command(about = "MCP server for kintone apps, records, comments and files", long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "KINTONE_CONFIG", default_value = "kintone.toml")]
    pub config: PathBuf,

    /// kintone domain, e.g. example.cybozu.com
    #[arg(long, env = "KINTONE_DOMAIN")]
    pub domain: Option<String>,

    /// API token(s), comma separated (up to 9)
    #[arg(long, env = "KINTONE_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Login name for password authentication
    #[arg(long, env = "KINTONE_USERNAME")]
    pub username: Option<String>,

    /// Password for password authentication
    #[arg(long, env = "KINTONE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long = "timeout-secs", env = "KINTONE_TIMEOUT")]
    pub timeout_secs: Option<u64>,

    /// Log filter, e.g. info or kintone_sdk=debug
    #[arg(long, env = "KINTONE_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Keys accepted in the TOML file. Same names as the long flags, snake_cased.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSettings {
    pub domain: Option<String>,
    pub api_token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: Option<u64>,
    pub log_level: Option<String>,
}

impl FileSettings {
    /// Read `path`; a missing file yields empty settings.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "configuration file not found, skipping");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Configuration error: {0}")]
    Invalid(String),

    #[error(transparent)]
    Client(#[from] KintoneError),
}

/// Fully resolved settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub domain: String,
    pub credentials: Credentials,
    pub timeout: Duration,
    pub log_level: String,
}

impl Settings {
    /// Load the file named by `args.config` and layer `args` over it.
    pub fn load(args: Args) -> Result<Self, SettingsError> {
        let file = FileSettings::load(&args.config)?;
        Self::merge(args, file)
    }

    /// CLI/env values win over file values, key by key.
    pub fn merge(args: Args, file: FileSettings) -> Result<Self, SettingsError> {
        let domain = non_blank(args.domain)
            .or(non_blank(file.domain))
            .ok_or_else(|| {
                SettingsError::Invalid("domain is required (set KINTONE_DOMAIN or --domain)".into())
            })?;
        let domain = normalize_domain(&domain)?;

        let username = non_blank(args.username).or(non_blank(file.username));
        let password = non_blank(args.password).or(non_blank(file.password));
        if username.is_some() && password.is_none() {
            return Err(SettingsError::Invalid(
                "password is required when username is provided".into(),
            ));
        }

        let api_token = non_blank(args.api_token).or(non_blank(file.api_token));
        let credentials = Credentials {
            api_tokens: api_token
                .as_deref()
                .map(kintone_sdk::auth::split_tokens)
                .unwrap_or_default(),
            username,
            password,
        };
        resolve_auth_type(&credentials)?;

        let timeout_secs = args
            .timeout_secs
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(SettingsError::Invalid("timeout must be at least 1 second".into()));
        }

        let log_level = non_blank(args.log_level)
            .or(non_blank(file.log_level))
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        Ok(Self {
            domain,
            credentials,
            timeout: Duration::from_secs(timeout_secs),
            log_level,
        })
    }

    pub fn auth_type(&self) -> AuthType {
        // Checked in merge
        resolve_auth_type(&self.credentials).unwrap_or(AuthType::ApiToken)
    }

    pub fn build_client(&self) -> Result<KintoneClient, KintoneError> {
        KintoneClient::builder()
            .domain(self.domain.clone())
            .credentials(self.credentials.clone())
            .timeout(self.timeout)
            .build()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
