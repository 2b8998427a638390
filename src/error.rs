use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] postgres::Error),

    #[error("no database connection available: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("column {column} missing from {table} row")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },

    #[error("{table} row {id} has no geometry")]
    MissingGeometry { table: &'static str, id: i32 },

    #[error("{table} row {id} has geometry in SRID {srid}, expected 4326")]
    UnexpectedSrid {
        table: &'static str,
        id: i32,
        srid: i32,
    },

    #[error("spatial engine returned invalid GeoJSON: {0}")]
    GeoJson(#[from] serde_json::Error),

    #[error("No result found")]
    NotFound { table: &'static str, id: i32 },

    #[error("invalid page number {0}, pages start at 1")]
    InvalidPage(i64),

    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("environment variable {name} has invalid value {value:?}")]
    InvalidVar { name: &'static str, value: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}
