//! Batch ingestion of the groundwater export into the store files the
//! dashboard reads.

pub mod error;
pub mod fetcher;
pub mod transform;

use crate::config::{GroundwaterConfig, IngestConfig};
use crate::error::GroundwaterError;
use crate::ingest::error::IngestError;
use crate::ingest::fetcher::ExportFetcher;
use crate::ingest::transform::{readings_from_frame, summarize, unique_stations, RawReading};
use crate::store::extract::{measurements_to_frame, stations_to_frame};
use crate::store::schema::Table;
use crate::store::writer::{write_csv, write_parquet};
use crate::types::year_range::YearRange;
use crate::utils::ensure_dir_exists;
use log::info;
use polars::prelude::DataFrame;
use serde::Serialize;
use std::path::PathBuf;
use tokio::task;

/// Outcome of an ingestion run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestSummary {
    pub years: YearRange,
    /// Parsed export rows before aggregation.
    pub raw_rows: usize,
    pub stations: usize,
    /// Daily mean rows written to the measurement table.
    pub measurements: usize,
    pub files: Vec<PathBuf>,
}

pub struct Ingestor {
    ingest: IngestConfig,
    store: GroundwaterConfig,
}

impl Ingestor {
    pub fn new(ingest: IngestConfig, store: GroundwaterConfig) -> Ingestor {
        Ingestor { ingest, store }
    }

    /// Downloads every configured year and rewrites the measurement and
    /// station tables under the store's data directory.
    pub async fn run(&self) -> Result<IngestSummary, GroundwaterError> {
        let years = self.ingest.years()?;
        let fetcher = ExportFetcher::new(&self.ingest)?;

        let mut readings = Vec::new();
        for year in years.years() {
            let df = fetcher.fetch_year(year).await?;
            let parsed = readings_from_frame(&df)?;
            info!("Parsed {} readings for {}", parsed.len(), year);
            readings.extend(parsed);
        }

        self.persist(years, &readings).await
    }

    /// Aggregates `readings` and writes both tables as Parquet and CSV.
    pub async fn persist(
        &self,
        years: YearRange,
        readings: &[RawReading],
    ) -> Result<IngestSummary, GroundwaterError> {
        let data_dir = &self.store.data_dir;
        ensure_dir_exists(data_dir)
            .await
            .map_err(|e| IngestError::DirCreation(data_dir.clone(), e))?;

        let stations = unique_stations(readings);
        let measurements = summarize(readings);
        info!(
            "Aggregated {} readings into {} daily means for {} stations",
            readings.len(),
            measurements.len(),
            stations.len()
        );

        let mut files = Vec::new();
        for (table, df) in [
            (Table::Measurements, measurements_to_frame(&measurements)?),
            (Table::Stations, stations_to_frame(&stations)?),
        ] {
            files.extend(self.write_table(table, df).await?);
        }

        Ok(IngestSummary {
            years,
            raw_rows: readings.len(),
            stations: stations.len(),
            measurements: measurements.len(),
            files,
        })
    }

    /// Writes `df` to the default Parquet path of `table` and a CSV sibling.
    async fn write_table(&self, table: Table, mut df: DataFrame) -> Result<Vec<PathBuf>, IngestError> {
        let parquet_path = self
            .store
            .data_dir
            .join(table.default_file_name(&self.store.identifier));
        let csv_path = parquet_path.with_extension("csv");
        let separator = self.store.csv_separator;

        let paths = vec![parquet_path.clone(), csv_path.clone()];
        task::spawn_blocking(move || {
            write_parquet(&mut df, &parquet_path)?;
            write_csv(&mut df, &csv_path, separator)?;
            Ok::<(), IngestError>(())
        })
        .await??;
        info!("Wrote {} table to {:?}", table, paths);
        Ok(paths)
    }
}
