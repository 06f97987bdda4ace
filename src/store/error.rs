use crate::store::schema::Table;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Required {table} file '{path}' does not exist")]
    MissingFile { table: Table, path: PathBuf },

    #[error("Failed to open {table} file '{path}'")]
    FileOpen {
        table: Table,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read parquet file '{0}'")]
    ParquetRead(PathBuf, #[source] PolarsError),

    #[error("Failed to read CSV file '{0}'")]
    CsvRead(PathBuf, #[source] PolarsError),

    #[error("Required column '{column}' not found in {table} table")]
    MissingColumn { table: Table, column: String },

    #[error("Failed to normalise column types of {table} table: {source}")]
    ColumnCast {
        table: Table,
        #[source]
        source: PolarsError,
    },

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),

    #[error("Duplicate station id '{0}' in station table")]
    DuplicateStation(String),

    #[error("Unexpected data in {table} table at row {row}: {message}")]
    UnexpectedData {
        table: Table,
        row: usize,
        message: String,
    },

    // Errors writing tables (ingestion output, fixtures)
    #[error("I/O error writing table file '{0}'")]
    WriteIo(PathBuf, #[source] std::io::Error),
    #[error("Encoding error writing table file '{0}'")]
    WritePolars(PathBuf, #[source] PolarsError),
}
