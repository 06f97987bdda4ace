use crate::ingest::error::IngestError;
use crate::store::schema::pad_station_code;
use crate::types::measurement::Measurement;
use crate::types::station::{LatLon, Station};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use log::warn;
use polars::prelude::*;
use std::collections::BTreeMap;

/// One row of the portal export.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReading {
    /// Zero-padded station code.
    pub station_id: String,
    pub station_name: String,
    /// Calendar date in the export's timezone.
    pub date: NaiveDate,
    pub value: f64,
    pub location: LatLon,
}

fn string_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked, IngestError> {
    df.column(name)
        .map_err(|_| IngestError::MissingColumn(name.to_string()))?
        .str()
        .map_err(|e| IngestError::ColumnType {
            column: name.to_string(),
            source: e,
        })
}

/// Date part of an export timestamp. The portal renders RFC 3339 timestamps
/// with the offset of the requested timezone.
pub(crate) fn parse_timestamp(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().replace(',', ".").parse().ok().filter(|v: &f64| v.is_finite())
}

/// Converts an all-string export frame into readings. Rows with an unparsable
/// timestamp, value or coordinate are skipped.
pub fn readings_from_frame(df: &DataFrame) -> Result<Vec<RawReading>, IngestError> {
    if df.height() == 0 {
        return Ok(Vec::new());
    }
    let timestamps = string_column(df, "timestamp")?;
    let codes = string_column(df, "stationnr")?;
    let names = string_column(df, "stationname")?;
    let values = string_column(df, "value")?;
    let lats = string_column(df, "lat")?;
    let lons = string_column(df, "lon")?;

    let mut readings = Vec::with_capacity(df.height());
    let mut skipped = 0usize;
    for row in 0..df.height() {
        let parsed = (|| {
            Some(RawReading {
                station_id: codes
                    .get(row)
                    .filter(|code| !code.trim().is_empty())
                    .map(pad_station_code)?,
                station_name: names.get(row).unwrap_or_default().trim().to_string(),
                date: parse_timestamp(timestamps.get(row)?)?,
                value: parse_number(values.get(row)?)?,
                location: LatLon(parse_number(lats.get(row)?)?, parse_number(lons.get(row)?)?),
            })
        })();
        match parsed {
            Some(reading) => readings.push(reading),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!("Skipped {} unparsable export rows", skipped);
    }
    Ok(readings)
}

/// One station per code, taking name and location from its last reading.
/// Ordered by station code.
pub fn unique_stations(readings: &[RawReading]) -> Vec<Station> {
    let mut stations = BTreeMap::new();
    for reading in readings {
        stations.insert(
            reading.station_id.as_str(),
            (reading.station_name.as_str(), reading.location),
        );
    }
    stations
        .into_iter()
        .map(|(id, (name, location))| Station {
            id: id.to_string(),
            name: name.to_string(),
            location,
        })
        .collect()
}

/// Daily mean per station, sorted by station code then date.
pub fn summarize(readings: &[RawReading]) -> Vec<Measurement> {
    let mut sums: BTreeMap<(&str, NaiveDate), (f64, u32)> = BTreeMap::new();
    for reading in readings {
        let entry = sums
            .entry((reading.station_id.as_str(), reading.date))
            .or_insert((0.0, 0));
        entry.0 += reading.value;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|((station_id, date), (sum, count))| Measurement {
            station_id: station_id.to_string(),
            year: date.year(),
            month: date.month(),
            date,
            day_in_year: date.ordinal(),
            value: sum / f64::from(count),
        })
        .collect()
}
