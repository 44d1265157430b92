use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub tmdb: Option<TmdbConfig>,
    #[serde(default)]
    pub trending: TrendingConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    3000
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign access tokens.
    pub token_secret: String,
    /// Access token lifetime in seconds (default: 1 hour).
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
}

fn default_token_ttl() -> u64 {
    3600
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("flickvault.db")
}

/// TMDB API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    /// TMDB API key (required).
    pub api_key: String,
    /// Base URL (default: https://api.themoviedb.org/3).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Request timeout in seconds (default: 10)
    #[serde(default = "default_tmdb_timeout")]
    pub timeout_secs: u64,
}

fn default_tmdb_timeout() -> u64 {
    10
}

/// Trending cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrendingConfig {
    /// Age after which the cached trending set is refreshed.
    #[serde(default = "default_freshness_days")]
    pub freshness_days: u32,
    /// Maximum number of concurrent external id lookups during a refresh.
    #[serde(default = "default_lookup_concurrency")]
    pub lookup_concurrency: usize,
    /// When set, a background task checks freshness on this interval.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_refresh_secs: Option<u64>,
}

impl Default for TrendingConfig {
    fn default() -> Self {
        Self {
            freshness_days: default_freshness_days(),
            lookup_concurrency: default_lookup_concurrency(),
            background_refresh_secs: None,
        }
    }
}

fn default_freshness_days() -> u32 {
    7
}

fn default_lookup_concurrency() -> usize {
    8
}

/// CORS configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CorsConfig {
    /// Origins allowed to make credentialed requests.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Catalog configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// JSON file imported into the catalog at startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_file: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmdb: Option<SanitizedTmdbConfig>,
    pub trending: TrendingConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub token_secret_configured: bool,
    pub token_ttl_secs: u64,
}

/// Sanitized TMDB config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTmdbConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub api_key_configured: bool,
    pub timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                token_secret_configured: !config.auth.token_secret.is_empty(),
                token_ttl_secs: config.auth.token_ttl_secs,
            },
            server: config.server.clone(),
            database: config.database.clone(),
            tmdb: config.tmdb.as_ref().map(|t| SanitizedTmdbConfig {
                base_url: t.base_url.clone(),
                api_key_configured: !t.api_key.is_empty(),
                timeout_secs: t.timeout_secs,
            }),
            trending: config.trending.clone(),
            cors: config.cors.clone(),
        }
    }
}
