use crate::store::error::StoreError;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Writes `df` as a Snappy-compressed Parquet file.
pub fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<(), StoreError> {
    let file = File::create(path).map_err(|e| StoreError::WriteIo(path.to_path_buf(), e))?;
    ParquetWriter::new(file)
        .with_compression(ParquetCompression::Snappy)
        .finish(df)
        .map_err(|e| StoreError::WritePolars(path.to_path_buf(), e))?;
    Ok(())
}

/// Writes `df` as a delimited CSV file with a header row.
pub fn write_csv(df: &mut DataFrame, path: &Path, separator: u8) -> Result<(), StoreError> {
    let file = File::create(path).map_err(|e| StoreError::WriteIo(path.to_path_buf(), e))?;
    CsvWriter::new(file)
        .include_header(true)
        .with_separator(separator)
        .finish(df)
        .map_err(|e| StoreError::WritePolars(path.to_path_buf(), e))
}
