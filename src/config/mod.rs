use std::env;
use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
/// Two weeks, matching the usual session cookie age.
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 14;
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` runs the server on in-memory storage.
    pub database: Option<DatabaseConfig>,
    pub host: IpAddr,
    pub port: u16,
    pub session_ttl_hours: i64,
    /// Enables HSTS and `Secure` session cookies.
    pub production: bool,
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .map(|url| DatabaseConfig {
                url,
                max_connections: parse_or(
                    &lookup,
                    "DATABASE_MAX_CONNECTIONS",
                    DEFAULT_MAX_CONNECTIONS,
                ),
            });

        let session_ttl_hours =
            parse_or(&lookup, "SESSION_TTL_HOURS", DEFAULT_SESSION_TTL_HOURS).clamp(1, 24 * 365);

        let production = lookup("RUST_ENV")
            .map(|v| v.to_lowercase() == "production")
            .unwrap_or(false);

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            database,
            host: parse_or(&lookup, "HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            port: parse_or(&lookup, "PORT", DEFAULT_PORT),
            session_ttl_hours,
            production,
            cors_allowed_origins,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Config: invalid {} '{}': {}; using {}", key, raw, e, default);
                default
            }
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);

        assert!(config.database.is_none());
        assert_eq!(config.bind_addr(), "0.0.0.0:3001".parse().unwrap());
        assert_eq!(config.session_ttl_hours, DEFAULT_SESSION_TTL_HOURS);
        assert!(!config.production);
        assert_eq!(
            config.cors_allowed_origins,
            ["http://localhost:3000", "http://localhost:5173"]
        );
    }

    #[test]
    fn test_database_settings() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/portal"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
        ]);

        assert_eq!(
            config.database,
            Some(DatabaseConfig {
                url: "postgres://localhost/portal".to_string(),
                max_connections: 12,
            })
        );
    }

    #[test]
    fn test_blank_database_url_means_in_memory() {
        assert!(config_from(&[("DATABASE_URL", "  ")]).database.is_none());
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("PORT", "not-a-port"),
            ("HOST", "127.0.0.1"),
            ("SESSION_TTL_HOURS", "0"),
            ("RUST_ENV", "Production"),
            ("CORS_ALLOWED_ORIGINS", " https://events.example.com , ,"),
        ]);

        assert_eq!(config.bind_addr(), "127.0.0.1:3001".parse().unwrap());
        assert_eq!(config.session_ttl_hours, 1);
        assert!(config.production);
        assert_eq!(config.cors_allowed_origins, ["https://events.example.com"]);
    }
}
