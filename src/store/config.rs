//! Connection settings for the Postgres record store.

use super::StoreError;

/// Default number of idle connections kept by the pool.
const DEFAULT_MAX_IDLE: usize = 4;

/// Connection configuration.
///
/// Built either from an explicit libpq-style connection string or from the
/// standard environment variables:
/// - PGHOST (default: localhost)
/// - PGPORT (default: 5432)
/// - PGUSER (default: $USER)
/// - PGPASSWORD (default: empty)
/// - PGDATABASE (default: same as PGUSER)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub connection_string: String,
    /// Negotiate TLS (hosted databases require it).
    pub tls: bool,
    /// Idle connections kept for reuse.
    pub max_idle: usize,
}

impl StoreConfig {
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            tls: false,
            max_idle: DEFAULT_MAX_IDLE,
        }
    }

    /// Builds a configuration from the PG* environment variables.
    ///
    /// Uses $USER as default if PGUSER is not set.
    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, StoreError> {
        let user = get("PGUSER")
            .or_else(|| get("USER"))
            .ok_or_else(|| StoreError::Connection("PGUSER or USER not set".to_string()))?;

        let host = get("PGHOST").unwrap_or_else(|| "localhost".to_string());
        let port = get("PGPORT").unwrap_or_else(|| "5432".to_string());
        let password = get("PGPASSWORD").unwrap_or_default();
        let database = get("PGDATABASE").unwrap_or_else(|| user.clone());
        let tls = get("PGSSLMODE")
            .map(|mode| matches!(mode.as_str(), "require" | "verify-ca" | "verify-full"))
            .unwrap_or(false);

        let connection_string = if password.is_empty() {
            format!("host={} port={} user={} dbname={}", host, port, user, database)
        } else {
            format!(
                "host={} port={} user={} password={} dbname={}",
                host, port, user, password, database
            )
        };

        Ok(Self {
            connection_string,
            tls,
            max_idle: DEFAULT_MAX_IDLE,
        })
    }

    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    /// Connection string with the password masked, for logs.
    pub fn redacted(&self) -> String {
        self.connection_string
            .split_whitespace()
            .map(|token| {
                if token.starts_with("password=") {
                    "password=***"
                } else {
                    token
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn from_env_uses_defaults() {
        let cfg = StoreConfig::from_lookup(lookup(&[("USER", "survey")])).unwrap();
        assert_eq!(
            cfg.connection_string,
            "host=localhost port=5432 user=survey dbname=survey"
        );
        assert!(!cfg.tls);
    }

    #[test]
    fn from_env_full_settings() {
        let cfg = StoreConfig::from_lookup(lookup(&[
            ("PGUSER", "app"),
            ("PGHOST", "db.example.org"),
            ("PGPORT", "6543"),
            ("PGPASSWORD", "secret"),
            ("PGDATABASE", "postgres"),
            ("PGSSLMODE", "require"),
        ]))
        .unwrap();
        assert_eq!(
            cfg.connection_string,
            "host=db.example.org port=6543 user=app password=secret dbname=postgres"
        );
        assert!(cfg.tls);
        assert_eq!(
            cfg.redacted(),
            "host=db.example.org port=6543 user=app password=*** dbname=postgres"
        );
    }

    #[test]
    fn from_env_requires_a_user() {
        let err = StoreConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, StoreError::Connection(_)));
    }
}
