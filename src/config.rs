use anyhow::Context;
use serde::Deserialize;

/// Prefix of `DATABASE_URL` that selects the in-process store.
pub const MEMORY_URL_PREFIX: &str = "memory://";

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn is_memory(&self) -> bool {
        self.url.starts_with(MEMORY_URL_PREFIX)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Store Argon2 hashes instead of the submitted password.
    pub hash_passwords: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;
        let max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", 10u32)?;
        let port = parse_or(&lookup, "APP_PORT", 5000u16)?;
        let hash_passwords = parse_or(&lookup, "AUTH_HASH_PASSWORDS", false)?;

        Ok(Self {
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            database: DatabaseConfig {
                url,
                max_connections,
            },
            auth: AuthConfig { hash_passwords },
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        None => Ok(default),
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
    fn defaults_apply_when_only_database_url_is_set() {
        let cfg = AppConfig::from_lookup(lookup_from(&[(
            "DATABASE_URL",
            "postgres://localhost/bookstore_db",
        )]))
        .expect("config");
        assert_eq!(cfg.listen_addr(), "0.0.0.0:5000");
        assert_eq!(cfg.database.max_connections, 10);
        assert!(!cfg.auth.hash_passwords);
        assert!(!cfg.database.is_memory());
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let err = AppConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "memory://"),
            ("APP_HOST", "127.0.0.1"),
            ("APP_PORT", "8081"),
            ("DB_MAX_CONNECTIONS", "3"),
            ("AUTH_HASH_PASSWORDS", "true"),
        ]))
        .expect("config");
        assert_eq!(cfg.listen_addr(), "127.0.0.1:8081");
        assert_eq!(cfg.database.max_connections, 3);
        assert!(cfg.auth.hash_passwords);
        assert!(cfg.database.is_memory());
    }

    #[test]
    fn garbage_port_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "memory://"),
            ("APP_PORT", "fifty"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("APP_PORT"));
    }
}
