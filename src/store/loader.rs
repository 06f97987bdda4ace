use crate::store::error::StoreError;
use crate::store::schema::{Table, BOREHOLE_KEY_COLUMN, STATION_COLUMN};
use log::{debug, info};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Reads store tables from Parquet or delimited CSV files into normalised
/// `DataFrame`s.
///
/// Normalisation casts every required column to the type the queries rely on
/// (station codes as strings, integer calendar fields as `Int64`, dates as
/// `Date`, readings as `Float64`), so CSV and Parquet sources behave the same.
pub struct TableLoader {
    separator: u8,
}

impl TableLoader {
    pub fn new(separator: u8) -> TableLoader {
        TableLoader { separator }
    }

    /// Loads and normalises `table` from `path`. The format is chosen by the
    /// file extension: `.parquet` is read as Parquet, anything else as CSV.
    pub fn load(&self, table: Table, path: &Path) -> Result<DataFrame, StoreError> {
        if !path.is_file() {
            return Err(StoreError::MissingFile {
                table,
                path: path.to_path_buf(),
            });
        }

        let raw = if is_parquet(path) {
            Self::read_parquet(table, path)?
        } else {
            self.read_csv(path)?
        };
        debug!(
            "Read {} rows with columns {:?} from {:?}",
            raw.height(),
            raw.get_column_names(),
            path
        );

        for column in table.required_columns() {
            if raw.get_column_index(column).is_none() {
                return Err(StoreError::MissingColumn {
                    table,
                    column: column.to_string(),
                });
            }
        }

        let df = Self::normalise(table, raw)?;
        info!("Loaded {} {} rows from {:?}", df.height(), table, path);
        Ok(df)
    }

    fn read_parquet(table: Table, path: &Path) -> Result<DataFrame, StoreError> {
        let file = File::open(path).map_err(|e| StoreError::FileOpen {
            table,
            path: path.to_path_buf(),
            source: e,
        })?;
        ParquetReader::new(file)
            .finish()
            .map_err(|e| StoreError::ParquetRead(path.to_path_buf(), e))
    }

    /// Every CSV column is read as a string first so zero-padded station codes
    /// survive; the typed casts happen in `normalise`.
    fn read_csv(&self, path: &Path) -> Result<DataFrame, StoreError> {
        let separator = self.separator;
        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .map_parse_options(move |options| options.with_separator(separator))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .map_err(|e| StoreError::CsvRead(path.to_path_buf(), e))?
            .finish()
            .map_err(|e| StoreError::CsvRead(path.to_path_buf(), e))
    }

    /// Casts strictly, so a cell that cannot be converted fails the load
    /// instead of turning into a null. Empty readings are dropped; any other
    /// empty required cell except a station name fails the load.
    fn normalise(table: Table, df: DataFrame) -> Result<DataFrame, StoreError> {
        let lazy = df.lazy();
        // `reading` is the measured column whose empty cells are dropped.
        let (normalised, reading) = match table {
            Table::Measurements => (
                lazy.select([
                    col(STATION_COLUMN).strict_cast(DataType::String),
                    col("year").strict_cast(DataType::Int64),
                    col("month").strict_cast(DataType::Int64),
                    col("date").strict_cast(DataType::Date),
                    col("day_in_year").strict_cast(DataType::Int64),
                    col("value").strict_cast(DataType::Float64),
                ]),
                Some("value"),
            ),
            Table::Stations => (
                lazy.select([
                    col(STATION_COLUMN).strict_cast(DataType::String),
                    col("stationname").strict_cast(DataType::String),
                    col("lat").strict_cast(DataType::Float64),
                    col("lon").strict_cast(DataType::Float64),
                ]),
                None,
            ),
            // Free-form: keep every column, only the key gets a fixed type.
            Table::Boreholes => (
                lazy.with_column(col(BOREHOLE_KEY_COLUMN).strict_cast(DataType::String)),
                None,
            ),
            Table::Precipitation => (
                lazy.select([
                    col("jahr").strict_cast(DataType::Int64),
                    col("date").strict_cast(DataType::Date),
                    col("precipitation").strict_cast(DataType::Float64),
                ]),
                Some("precipitation"),
            ),
        };
        let df = normalised
            .collect()
            .map_err(|e| StoreError::ColumnCast { table, source: e })?;

        if table == Table::Boreholes {
            return Ok(df);
        }
        for column in table.required_columns() {
            // A station without a name is still addressable by its code.
            if Some(column) != reading && column != "stationname" {
                reject_nulls(table, &df, column)?;
            }
        }
        match reading {
            // Days without a reading carry no information for the charts or averages.
            Some(reading) if df.column(reading)?.null_count() > 0 => {
                debug!(
                    "Dropping {} {} rows without '{}'",
                    df.column(reading)?.null_count(),
                    table,
                    reading
                );
                Ok(df.lazy().filter(col(reading).is_not_null()).collect()?)
            }
            _ => Ok(df),
        }
    }
}

fn reject_nulls(table: Table, df: &DataFrame, column: &str) -> Result<(), StoreError> {
    let values = df.column(column)?;
    if values.null_count() == 0 {
        return Ok(());
    }
    let row = values
        .as_materialized_series()
        .is_null()
        .into_iter()
        .position(|is_null| is_null == Some(true))
        .unwrap_or_default();
    Err(StoreError::UnexpectedData {
        table,
        row,
        message: format!("empty '{}'", column),
    })
}

fn is_parquet(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"))
}
