//! Configuration loaded from the environment

use std::time::Duration;

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub database_max_connections: u32,
    pub rate_cache_ttl: Duration,
    pub rate_cache_capacity: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
}

impl Config {
    /// Read configuration from environment variables (after `.env`, if any).
    ///
    /// Unparseable optional values fall back to their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let parsed = |key: &str| lookup(key).and_then(|v| v.parse::<u64>().ok());

        Ok(Self {
            database_url,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            database_max_connections: parsed("DATABASE_MAX_CONNECTIONS")
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(10),
            rate_cache_ttl: Duration::from_secs(parsed("RATE_CACHE_TTL_SECS").unwrap_or(300)),
            rate_cache_capacity: parsed("RATE_CACHE_CAPACITY").unwrap_or(1000),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/rentals")])).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.rate_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.rate_cache_capacity, 1000);
    }

    #[test]
    fn test_overrides_and_bad_values() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/rentals"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("RATE_CACHE_TTL_SECS", "60"),
            ("RATE_CACHE_CAPACITY", "lots"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.rate_cache_ttl, Duration::from_secs(60));
        assert_eq!(config.rate_cache_capacity, 1000);
    }

    #[test]
    fn test_missing_database_url() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }
}
