mod chart;
mod config;
mod error;
mod filtering;
mod groundwater;
mod ingest;
mod store;
mod types;
mod utils;

#[cfg(test)]
mod test_support;

pub use error::GroundwaterError;
pub use groundwater::Groundwater;

pub use config::*;

pub use chart::*;
pub use filtering::GroundwaterFrameFilterExt;

pub use types::borehole::{BoreholeField, BoreholeInfo};
pub use types::extent::ValueExtent;
pub use types::measurement::{Measurement, PrecipitationReading};
pub use types::monthly_table::{MonthlyAverageRow, MonthlyAverageTable, MONTH_ABBREVIATIONS};
pub use types::station::{LatLon, Station};
pub use types::year_range::YearRange;

pub use store::error::StoreError;
pub use store::extract::{measurements_to_frame, stations_to_frame};
pub use store::loader::TableLoader;
pub use store::schema::{pad_station_code, Table, STATION_CODE_WIDTH};
pub use store::writer::{write_csv, write_parquet};

pub use ingest::error::IngestError;
pub use ingest::fetcher::ExportFetcher;
pub use ingest::transform::{readings_from_frame, summarize, unique_stations, RawReading};
pub use ingest::{IngestSummary, Ingestor};

pub use utils::default_data_dir;
