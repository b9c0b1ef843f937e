//! Runtime settings read from the environment.

use crate::error::ConfigError;
use crate::query::{PageLimits, DEFAULT_PER_PAGE, MAX_PER_PAGE};
use std::net::SocketAddr;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: Option<String>,
    pub backend: StoreBackend,
    pub bind: SocketAddr,
    pub max_connections: u32,
    pub limits: PageLimits,
    pub body_limit: usize,
    pub seed: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").filter(|s| !s.trim().is_empty());
        let backend = match lookup("LEDGER_STORE").as_deref().map(str::trim) {
            None | Some("") => {
                if database_url.is_some() {
                    StoreBackend::Postgres
                } else {
                    StoreBackend::Memory
                }
            }
            Some(s) if s.eq_ignore_ascii_case("postgres") => StoreBackend::Postgres,
            Some(s) if s.eq_ignore_ascii_case("memory") => StoreBackend::Memory,
            Some(s) => {
                return Err(ConfigError::Invalid {
                    key: "LEDGER_STORE",
                    value: s.to_string(),
                })
            }
        };
        if backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing {
                key: "DATABASE_URL",
                reason: "LEDGER_STORE is postgres",
            });
        }

        let bind = parse_or(&lookup, "LEDGER_BIND", SocketAddr::from(([0, 0, 0, 0], 3000)))?;
        let max_connections = parse_or(&lookup, "LEDGER_MAX_CONNECTIONS", 5u32)?;
        let default_per_page = parse_or(&lookup, "LEDGER_DEFAULT_PER_PAGE", DEFAULT_PER_PAGE)?;
        let max_per_page = parse_or(&lookup, "LEDGER_MAX_PER_PAGE", MAX_PER_PAGE)?;
        if default_per_page > max_per_page {
            return Err(ConfigError::Invalid {
                key: "LEDGER_DEFAULT_PER_PAGE",
                value: default_per_page.to_string(),
            });
        }
        let body_limit = parse_or(&lookup, "LEDGER_BODY_LIMIT", 64 * 1024usize)?;
        let seed = match lookup("LEDGER_SEED").as_deref().map(str::trim) {
            None | Some("") | Some("0") => false,
            Some(s) if s.eq_ignore_ascii_case("false") => false,
            Some(s) if s == "1" || s.eq_ignore_ascii_case("true") => true,
            Some(s) => {
                return Err(ConfigError::Invalid {
                    key: "LEDGER_SEED",
                    value: s.to_string(),
                })
            }
        };

        Ok(Settings {
            database_url,
            backend,
            bind,
            max_connections,
            limits: PageLimits {
                default_per_page,
                max_per_page,
            },
            body_limit,
            seed,
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let env: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_use_memory_store() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.backend, StoreBackend::Memory);
        assert_eq!(s.bind.port(), 3000);
        assert_eq!(s.limits, PageLimits::default());
        assert!(!s.seed);
    }

    #[test]
    fn database_url_selects_postgres() {
        let s = settings(&[("DATABASE_URL", "postgres://localhost/ledger")]).unwrap();
        assert_eq!(s.backend, StoreBackend::Postgres);
        let s = settings(&[("DATABASE_URL", "postgres://localhost/ledger"), ("LEDGER_STORE", "memory")]).unwrap();
        assert_eq!(s.backend, StoreBackend::Memory);
    }

    #[test]
    fn postgres_without_url_is_rejected() {
        assert!(matches!(
            settings(&[("LEDGER_STORE", "postgres")]),
            Err(ConfigError::Missing { key: "DATABASE_URL", .. })
        ));
    }

    #[test]
    fn invalid_values_name_the_variable() {
        assert!(matches!(
            settings(&[("LEDGER_MAX_PER_PAGE", "lots")]),
            Err(ConfigError::Invalid { key: "LEDGER_MAX_PER_PAGE", .. })
        ));
        assert!(matches!(
            settings(&[("LEDGER_DEFAULT_PER_PAGE", "50"), ("LEDGER_MAX_PER_PAGE", "10")]),
            Err(ConfigError::Invalid { key: "LEDGER_DEFAULT_PER_PAGE", .. })
        ));
        assert!(matches!(
            settings(&[("LEDGER_SEED", "maybe")]),
            Err(ConfigError::Invalid { key: "LEDGER_SEED", .. })
        ));
    }

    #[test]
    fn page_limits_and_seed_are_configurable() {
        let s = settings(&[
            ("LEDGER_DEFAULT_PER_PAGE", "10"),
            ("LEDGER_MAX_PER_PAGE", "50"),
            ("LEDGER_SEED", "true"),
            ("LEDGER_BIND", "127.0.0.1:8080"),
        ])
        .unwrap();
        assert_eq!(s.limits.default_per_page, 10);
        assert_eq!(s.limits.max_per_page, 50);
        assert!(s.seed);
        assert_eq!(s.bind.port(), 8080);
    }
}
