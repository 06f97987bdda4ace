use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One (daily mean) water level reading at a station.
///
/// `year`, `month` and `day_in_year` are derived from `date` during ingestion
/// and kept alongside it so charts can overlay years on a common day axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub station_id: String,
    pub year: i32,
    pub month: u32,
    pub date: NaiveDate,
    pub day_in_year: u32,
    /// Water level in metres above sea level.
    pub value: f64,
}

/// Daily precipitation at the reference gauge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecipitationReading {
    /// Constant label of the gauge the series comes from, used for grouping/colouring.
    pub reference_station_label: String,
    pub year: i32,
    pub date: NaiveDate,
    pub precipitation_mm: f64,
}
