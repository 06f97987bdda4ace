use crate::store::error::StoreError;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    // Errors during CSV parsing (inside blocking task)
    #[error("I/O error processing the {year} export")]
    CsvReadIo {
        year: i32,
        #[source]
        source: std::io::Error,
    },
    #[error("Parsing error processing the {year} export")]
    CsvReadPolars {
        year: i32,
        #[source]
        source: PolarsError,
    },

    #[error("Export is missing required column '{0}'")]
    MissingColumn(String),

    #[error("Export column '{column}' could not be read as text")]
    ColumnType {
        column: String,
        #[source]
        source: PolarsError,
    },

    #[error("Failed to create data directory '{0}'")]
    DirCreation(PathBuf, #[source] std::io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
