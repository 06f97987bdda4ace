//! Configuration of the store location and of the ingestion job.
//!
//! Both structures are plain values built once and passed to
//! [`crate::Groundwater::load`] or [`crate::Ingestor::new`]; nothing is read
//! from global state.

use crate::error::GroundwaterError;
use crate::store::schema::Table;
use crate::types::year_range::YearRange;
use crate::utils::default_data_dir;
use bon::Builder;
use chrono::{Datelike, Local};
use std::path::PathBuf;
use std::time::Duration;

/// Identifier of the groundwater dataset the store files are named after.
pub const DEFAULT_IDENTIFIER: &str = "100064";
/// Label attached to every precipitation reading.
pub const DEFAULT_REFERENCE_STATION: &str = "Basel-Binningen";
/// CSV export endpoint of the Basel-Stadt open data portal.
pub const DEFAULT_EXPORT_URL: &str =
    "https://data.bs.ch/api/explore/v2.1/catalog/datasets/100164/exports/csv";
/// First year with groundwater readings in the export.
pub const DEFAULT_FIRST_YEAR: i32 = 1976;

/// Where and how the store tables are read.
///
/// # Examples
///
/// ```
/// use groundwater::{GroundwaterConfig, Table};
/// use std::path::PathBuf;
///
/// let config = GroundwaterConfig::builder()
///     .data_dir("app/data")
///     .precipitation_file("/srv/meteo/basel.csv")
///     .build();
///
/// assert_eq!(
///     config.path(Table::Measurements),
///     PathBuf::from("app/data/100064_final.parquet")
/// );
/// assert_eq!(
///     config.path(Table::Precipitation),
///     PathBuf::from("/srv/meteo/basel.csv")
/// );
/// ```
#[derive(Debug, Clone, Builder)]
pub struct GroundwaterConfig {
    /// Directory holding the store files.
    #[builder(into, default = default_data_dir())]
    pub data_dir: PathBuf,
    /// Dataset identifier used to derive default file names.
    #[builder(into, default = DEFAULT_IDENTIFIER.to_string())]
    pub identifier: String,
    #[builder(into)]
    pub measurements_file: Option<PathBuf>,
    #[builder(into)]
    pub stations_file: Option<PathBuf>,
    #[builder(into)]
    pub boreholes_file: Option<PathBuf>,
    #[builder(into)]
    pub precipitation_file: Option<PathBuf>,
    /// Field separator of CSV tables.
    #[builder(default = b';')]
    pub csv_separator: u8,
    #[builder(into, default = DEFAULT_REFERENCE_STATION.to_string())]
    pub reference_station_label: String,
}

impl Default for GroundwaterConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl GroundwaterConfig {
    /// Resolved path of `table`: the explicit override if one is set, otherwise
    /// `<data_dir>/<identifier>_<suffix>.parquet`.
    pub fn path(&self, table: Table) -> PathBuf {
        let explicit = match table {
            Table::Measurements => &self.measurements_file,
            Table::Stations => &self.stations_file,
            Table::Boreholes => &self.boreholes_file,
            Table::Precipitation => &self.precipitation_file,
        };
        explicit
            .clone()
            .unwrap_or_else(|| self.data_dir.join(table.default_file_name(&self.identifier)))
    }
}

/// Parameters of the batch download from the open data portal.
#[derive(Debug, Clone, Builder)]
pub struct IngestConfig {
    #[builder(into, default = DEFAULT_EXPORT_URL.to_string())]
    pub base_url: String,
    #[builder(default = DEFAULT_FIRST_YEAR)]
    pub first_year: i32,
    /// Last year to fetch; the current year when unset.
    pub last_year: Option<i32>,
    /// Timezone the portal renders timestamps in.
    #[builder(into, default = "Europe/Zurich".to_string())]
    pub timezone: String,
    #[builder(default = Duration::from_secs(120))]
    pub timeout: Duration,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl IngestConfig {
    pub fn years(&self) -> Result<YearRange, GroundwaterError> {
        let last_year = self.last_year.unwrap_or_else(|| Local::now().year());
        YearRange::new(self.first_year, last_year)
    }
}
