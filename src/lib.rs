use postgres::{Connection, TlsMode};
use r2d2::Pool;
use r2d2_postgres::PostgresConnectionManager;

pub mod api;
pub mod config;
pub mod display;
pub mod error;
pub mod geojson;
pub mod models;
pub mod pagination;
pub mod queries;
pub mod serializers;

pub use crate::config::Config;
pub use crate::error::{Error, Result};

pub type DbPool = Pool<PostgresConnectionManager>;

pub fn establish_connection(database_url: &str) -> Result<Connection> {
    Ok(Connection::connect(database_url, TlsMode::None)?)
}

pub fn create_db_pool(config: &Config) -> Result<DbPool> {
    let manager = PostgresConnectionManager::new(
        config.database_url.as_str(),
        r2d2_postgres::TlsMode::None,
    )?;
    let pool = Pool::builder().max_size(config.pool_size).build(manager)?;
    Ok(pool)
}

/// Logs to stderr, filtered by `RUST_LOG` (default `info`).
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
