use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

/// Server configuration loaded from environment variables.
///
/// | Env Var                   | Default     |
/// |---------------------------|-------------|
/// | `DATABASE_URL`            | (required)  |
/// | `HOST`                    | `127.0.0.1` |
/// | `PORT`                    | `8000`      |
/// | `DB_MAX_CONNECTIONS`      | `5`         |
/// | `DB_ACQUIRE_TIMEOUT_SECS` | `3`         |
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url =
            lookup("DATABASE_URL").ok_or_else(|| anyhow!("DATABASE_URL must be set"))?;
        let acquire_timeout_secs = parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 3)?;

        Ok(Self {
            database_url,
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".into()),
            port: parse_or(&lookup, "PORT", 8000)?,
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?,
            acquire_timeout: Duration::from_secs(acquire_timeout_secs),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{e}"))
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/matches")]))
                .unwrap();
        assert_eq!(config.database_url, "postgres://localhost/matches");
        assert_eq!(config.bind_addr(), "127.0.0.1:8000");
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.acquire_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/matches"),
            ("HOST", "0.0.0.0"),
            ("PORT", "9090"),
            ("DB_MAX_CONNECTIONS", "20"),
            ("DB_ACQUIRE_TIMEOUT_SECS", "10"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:9090");
        assert_eq!(config.max_connections, 20);
        assert_eq!(config.acquire_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_missing_database_url() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_invalid_port() {
        let err = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/matches"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
