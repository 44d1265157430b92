use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Token secret is set and token TTL is positive
/// - Trending window and lookup concurrency are positive
/// - TMDB API key is set when the section is present
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.auth.token_secret.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "auth.token_secret must be set".to_string(),
        ));
    }

    if config.auth.token_ttl_secs == 0 {
        return Err(ConfigError::ValidationError(
            "auth.token_ttl_secs must be greater than 0".to_string(),
        ));
    }

    if config.trending.freshness_days == 0 {
        return Err(ConfigError::ValidationError(
            "trending.freshness_days must be greater than 0".to_string(),
        ));
    }

    if config.trending.lookup_concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "trending.lookup_concurrency must be greater than 0".to_string(),
        ));
    }

    if let Some(tmdb) = &config.tmdb {
        if tmdb.api_key.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "tmdb.api_key must be set when [tmdb] is configured".to_string(),
            ));
        }
    }

    Ok(())
}
