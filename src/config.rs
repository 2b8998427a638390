use std::env;

use crate::error::{Error, Result};

const DATABASE_URL_ENV: &str = "DATABASE_URL";

const BIND_ADDR_ENV: &str = "BIND_ADDR";
const BIND_ADDR_DEFAULT: &str = "0.0.0.0:5000";

const DATABASE_POOL_SIZE_ENV: &str = "DATABASE_POOL_SIZE";
const DATABASE_POOL_SIZE_DEFAULT: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub pool_size: u32,
}

impl Config {
    /// Reads the configuration from the process environment, after loading
    /// a `.env` file if one is present.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenv::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }
        Self::from_vars(|name| env::var(name).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup(DATABASE_URL_ENV)
            .filter(|url| !url.trim().is_empty())
            .ok_or(Error::MissingVar(DATABASE_URL_ENV))?;

        let bind_addr = lookup(BIND_ADDR_ENV)
            .filter(|addr| !addr.trim().is_empty())
            .unwrap_or_else(|| BIND_ADDR_DEFAULT.to_owned());

        let pool_size = match lookup(DATABASE_POOL_SIZE_ENV) {
            Some(ref var) if !var.trim().is_empty() => match var.trim().parse::<u32>() {
                Ok(size) if size >= 1 => size,
                _ => {
                    return Err(Error::InvalidVar {
                        name: DATABASE_POOL_SIZE_ENV,
                        value: var.clone(),
                    })
                }
            },
            _ => DATABASE_POOL_SIZE_DEFAULT,
        };

        Ok(Config {
            database_url,
            bind_addr,
            pool_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let config = config_from(&[("DATABASE_URL", "postgres://gis@localhost/gps")]).unwrap();
        assert_eq!(config.database_url, "postgres://gis@localhost/gps");
        assert_eq!(config.bind_addr, "0.0.0.0:5000");
        assert_eq!(config.pool_size, 10);
    }

    #[test]
    fn missing_database_url_is_an_error() {
        match config_from(&[("BIND_ADDR", "127.0.0.1:8088")]) {
            Err(Error::MissingVar(name)) => assert_eq!(name, "DATABASE_URL"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn pool_size_must_be_positive() {
        let err = config_from(&[
            ("DATABASE_URL", "postgres://localhost/gps"),
            ("DATABASE_POOL_SIZE", "0"),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::InvalidVar { name: "DATABASE_POOL_SIZE", .. }));

        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/gps"),
            ("DATABASE_POOL_SIZE", " 4 "),
            ("BIND_ADDR", "127.0.0.1:8088"),
        ])
        .unwrap();
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.bind_addr, "127.0.0.1:8088");
    }
}
