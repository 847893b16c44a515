use std::collections::HashMap;
use std::env;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::warn;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_PORT: u16 = 8081;
const DEFAULT_JWT_EXPIRY_HOURS: i64 = 24;
const MAX_JWT_EXPIRY_HOURS: i64 = 24 * 365;
const DEFAULT_SUPER_ADMIN_COMPANY: &str = "Platform";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";
const DEVELOPMENT_JWT_SECRET: &str = "development-only-queue-server-secret";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Absent in development means the in-memory store.
    pub database_url: Option<String>,
    pub port: u16,
    pub environment: Environment,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub db_max_connections: u32,
    pub request_timeout_secs: u64,
    pub cors_allowed_origins: Vec<String>,
    /// Platform operator created at startup when `SUPER_ADMIN_USERNAME` is set.
    pub super_admin: Option<SuperAdminSeed>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct SuperAdminSeed {
    pub company_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for SuperAdminSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuperAdminSeed")
            .field("company_name", &self.company_name)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_map(values: &HashMap<&str, &str>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| values.get(key).map(|v| v.to_string()))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = match get("RUST_ENV").map(|v| v.to_lowercase()).as_deref() {
            Some("production") => Environment::Production,
            None | Some("development") | Some("dev") | Some("test") => Environment::Development,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "RUST_ENV",
                    value: other.to_string(),
                })
            }
        };

        let database_url = get("DATABASE_URL");
        if database_url.is_none() && environment.is_production() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let jwt_secret = match get("JWT_SECRET") {
            Some(secret) => secret,
            None if environment.is_production() => return Err(ConfigError::Missing("JWT_SECRET")),
            None => {
                warn!("JWT_SECRET not set, using the development secret");
                DEVELOPMENT_JWT_SECRET.to_string()
            }
        };

        let jwt_expiry_hours = parse_or(
            "JWT_EXPIRY_HOURS",
            get("JWT_EXPIRY_HOURS"),
            DEFAULT_JWT_EXPIRY_HOURS,
        )?;
        if !(1..=MAX_JWT_EXPIRY_HOURS).contains(&jwt_expiry_hours) {
            return Err(ConfigError::Invalid {
                key: "JWT_EXPIRY_HOURS",
                value: jwt_expiry_hours.to_string(),
            });
        }

        let super_admin = match get("SUPER_ADMIN_USERNAME") {
            None => None,
            Some(username) => Some(SuperAdminSeed {
                company_name: get("SUPER_ADMIN_COMPANY")
                    .unwrap_or_else(|| DEFAULT_SUPER_ADMIN_COMPANY.to_string()),
                username,
                email: get("SUPER_ADMIN_EMAIL").ok_or(ConfigError::Missing("SUPER_ADMIN_EMAIL"))?,
                password: get("SUPER_ADMIN_PASSWORD")
                    .ok_or(ConfigError::Missing("SUPER_ADMIN_PASSWORD"))?,
            }),
        };

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            database_url,
            port: parse_or("PORT", get("PORT"), DEFAULT_PORT)?,
            environment,
            jwt_secret,
            jwt_expiry_hours,
            db_max_connections: parse_or(
                "DB_MAX_CONNECTIONS",
                get("DB_MAX_CONNECTIONS"),
                DEFAULT_DB_MAX_CONNECTIONS,
            )?,
            request_timeout_secs: parse_or(
                "REQUEST_TIMEOUT_SECS",
                get("REQUEST_TIMEOUT_SECS"),
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?,
            cors_allowed_origins,
            super_admin,
        })
    }

    /// Development defaults with no database, used by the test suite.
    pub fn for_tests() -> Self {
        Self {
            database_url: None,
            port: DEFAULT_PORT,
            environment: Environment::Development,
            jwt_secret: DEVELOPMENT_JWT_SECRET.to_string(),
            jwt_expiry_hours: DEFAULT_JWT_EXPIRY_HOURS,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            cors_allowed_origins: Vec::new(),
            super_admin: None,
        }
    }
}

fn parse_or<T: FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_defaults() {
        let config = Config::from_map(&HashMap::new()).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.database_url, None);
        assert_eq!(config.port, 8081);
        assert_eq!(config.jwt_expiry_hours, 24);
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.cors_allowed_origins.len(), 2);
    }

    #[test]
    fn test_production_requires_secret_and_database() {
        let values = HashMap::from([("RUST_ENV", "production"), ("JWT_SECRET", "s")]);
        assert_eq!(
            Config::from_map(&values).unwrap_err(),
            ConfigError::Missing("DATABASE_URL")
        );

        let values = HashMap::from([
            ("RUST_ENV", "Production"),
            ("DATABASE_URL", "postgres://localhost/queue"),
        ]);
        assert_eq!(
            Config::from_map(&values).unwrap_err(),
            ConfigError::Missing("JWT_SECRET")
        );
    }

    #[test]
    fn test_jwt_expiry_is_bounded() {
        for raw in ["0", "-3", "9223372036854775807"] {
            let values = HashMap::from([("JWT_EXPIRY_HOURS", raw)]);
            assert_eq!(
                Config::from_map(&values).unwrap_err(),
                ConfigError::Invalid {
                    key: "JWT_EXPIRY_HOURS",
                    value: raw.to_string(),
                }
            );
        }

        let values = HashMap::from([("JWT_EXPIRY_HOURS", "8760")]);
        assert_eq!(Config::from_map(&values).unwrap().jwt_expiry_hours, 8760);
    }

    #[test]
    fn test_super_admin_seed_needs_credentials() {
        let values = HashMap::from([("SUPER_ADMIN_USERNAME", "platform")]);
        assert_eq!(
            Config::from_map(&values).unwrap_err(),
            ConfigError::Missing("SUPER_ADMIN_EMAIL")
        );

        let values = HashMap::from([
            ("SUPER_ADMIN_USERNAME", "platform"),
            ("SUPER_ADMIN_EMAIL", "ops@queue.test"),
            ("SUPER_ADMIN_PASSWORD", "changeme"),
        ]);
        let seed = Config::from_map(&values).unwrap().super_admin.unwrap();
        assert_eq!(seed.company_name, "Platform");
        assert!(!format!("{seed:?}").contains("changeme"));

        assert_eq!(Config::from_map(&HashMap::new()).unwrap().super_admin, None);
    }

    #[test]
    fn test_invalid_numbers_are_reported() {
        let values = HashMap::from([("PORT", "eighty")]);
        assert!(matches!(
            Config::from_map(&values),
            Err(ConfigError::Invalid { key: "PORT", .. })
        ));
    }

    #[test]
    fn test_origins_are_split_and_trimmed() {
        let values = HashMap::from([(
            "CORS_ALLOWED_ORIGINS",
            " https://queue.example.com , ,https://admin.example.com",
        )]);
        let config = Config::from_map(&values).unwrap();
        assert_eq!(
            config.cors_allowed_origins,
            vec!["https://queue.example.com", "https://admin.example.com"]
        );
    }
}
