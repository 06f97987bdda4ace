//! Conversions between the normalised store frames and the typed records
//! handed to callers, plus the reverse direction used when writing tables.

use crate::store::error::StoreError;
use crate::store::schema::{Table, STATION_COLUMN};
use crate::types::measurement::{Measurement, PrecipitationReading};
use crate::types::station::{LatLon, Station};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;

/// `NaiveDate::num_days_from_ce` of 1970-01-01, the epoch polars dates count from.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

pub(crate) fn days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}

pub(crate) fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

fn column<'a>(df: &'a DataFrame, table: Table, name: &str) -> Result<&'a Column, StoreError> {
    df.column(name).map_err(|_| StoreError::MissingColumn {
        table,
        column: name.to_string(),
    })
}

fn get_strings(df: &DataFrame, table: Table, name: &str) -> Result<Vec<Option<String>>, StoreError> {
    Ok(column(df, table, name)?
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

fn get_ints(df: &DataFrame, table: Table, name: &str) -> Result<Vec<Option<i64>>, StoreError> {
    Ok(column(df, table, name)?.i64()?.into_iter().collect())
}

fn get_floats(df: &DataFrame, table: Table, name: &str) -> Result<Vec<Option<f64>>, StoreError> {
    Ok(column(df, table, name)?.f64()?.into_iter().collect())
}

fn get_dates(df: &DataFrame, table: Table, name: &str) -> Result<Vec<Option<NaiveDate>>, StoreError> {
    let days = column(df, table, name)?.cast(&DataType::Int32)?;
    Ok(days
        .i32()?
        .into_iter()
        .map(|value| value.and_then(days_to_date))
        .collect())
}

fn require<T>(value: Option<T>, table: Table, row: usize, name: &str) -> Result<T, StoreError> {
    value.ok_or_else(|| StoreError::UnexpectedData {
        table,
        row,
        message: format!("missing or invalid '{}'", name),
    })
}

fn narrow<T: TryFrom<i64>>(value: i64, table: Table, row: usize, name: &str) -> Result<T, StoreError> {
    T::try_from(value).map_err(|_| StoreError::UnexpectedData {
        table,
        row,
        message: format!("'{}' value {} out of range", name, value),
    })
}

/// Collects a normalised measurement frame into records, preserving row order.
pub(crate) fn measurements_from_frame(df: &DataFrame) -> Result<Vec<Measurement>, StoreError> {
    let table = Table::Measurements;
    let ids = get_strings(df, table, STATION_COLUMN)?;
    let years = get_ints(df, table, "year")?;
    let months = get_ints(df, table, "month")?;
    let dates = get_dates(df, table, "date")?;
    let days = get_ints(df, table, "day_in_year")?;
    let values = get_floats(df, table, "value")?;

    let mut measurements = Vec::with_capacity(df.height());
    for (row, station_id) in ids.into_iter().enumerate() {
        measurements.push(Measurement {
            station_id: require(station_id, table, row, STATION_COLUMN)?,
            year: narrow(require(years[row], table, row, "year")?, table, row, "year")?,
            month: narrow(require(months[row], table, row, "month")?, table, row, "month")?,
            date: require(dates[row], table, row, "date")?,
            day_in_year: narrow(
                require(days[row], table, row, "day_in_year")?,
                table,
                row,
                "day_in_year",
            )?,
            value: require(values[row], table, row, "value")?,
        });
    }
    Ok(measurements)
}

pub(crate) fn stations_from_frame(df: &DataFrame) -> Result<Vec<Station>, StoreError> {
    let table = Table::Stations;
    let ids = get_strings(df, table, STATION_COLUMN)?;
    let names = get_strings(df, table, "stationname")?;
    let lats = get_floats(df, table, "lat")?;
    let lons = get_floats(df, table, "lon")?;

    let mut stations = Vec::with_capacity(df.height());
    for (row, id) in ids.into_iter().enumerate() {
        stations.push(Station {
            id: require(id, table, row, STATION_COLUMN)?,
            // A station without a name is still addressable by its code.
            name: names[row].clone().unwrap_or_default(),
            location: LatLon(
                require(lats[row], table, row, "lat")?,
                require(lons[row], table, row, "lon")?,
            ),
        });
    }
    Ok(stations)
}

pub(crate) fn precipitation_from_frame(
    df: &DataFrame,
    label: &str,
) -> Result<Vec<PrecipitationReading>, StoreError> {
    let table = Table::Precipitation;
    let years = get_ints(df, table, "jahr")?;
    let dates = get_dates(df, table, "date")?;
    let amounts = get_floats(df, table, "precipitation")?;

    let mut readings = Vec::with_capacity(df.height());
    for (row, year) in years.into_iter().enumerate() {
        readings.push(PrecipitationReading {
            reference_station_label: label.to_string(),
            year: narrow(require(year, table, row, "jahr")?, table, row, "jahr")?,
            date: require(dates[row], table, row, "date")?,
            precipitation_mm: require(amounts[row], table, row, "precipitation")?,
        });
    }
    Ok(readings)
}

/// Builds a measurement frame with the store's column names and types.
pub fn measurements_to_frame(measurements: &[Measurement]) -> PolarsResult<DataFrame> {
    let dates = Column::new(
        "date".into(),
        measurements
            .iter()
            .map(|m| date_to_days(m.date))
            .collect::<Vec<i32>>(),
    )
    .cast(&DataType::Date)?;
    DataFrame::new(vec![
        Column::new(
            STATION_COLUMN.into(),
            measurements
                .iter()
                .map(|m| m.station_id.clone())
                .collect::<Vec<String>>(),
        ),
        Column::new(
            "year".into(),
            measurements.iter().map(|m| m.year as i64).collect::<Vec<i64>>(),
        ),
        Column::new(
            "month".into(),
            measurements.iter().map(|m| m.month as i64).collect::<Vec<i64>>(),
        ),
        dates,
        Column::new(
            "day_in_year".into(),
            measurements
                .iter()
                .map(|m| m.day_in_year as i64)
                .collect::<Vec<i64>>(),
        ),
        Column::new(
            "value".into(),
            measurements.iter().map(|m| m.value).collect::<Vec<f64>>(),
        ),
    ])
}

/// Builds a station frame with the store's column names and types.
pub fn stations_to_frame(stations: &[Station]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Column::new(
            STATION_COLUMN.into(),
            stations.iter().map(|s| s.id.clone()).collect::<Vec<String>>(),
        ),
        Column::new(
            "stationname".into(),
            stations.iter().map(|s| s.name.clone()).collect::<Vec<String>>(),
        ),
        Column::new(
            "lat".into(),
            stations.iter().map(|s| s.location.0).collect::<Vec<f64>>(),
        ),
        Column::new(
            "lon".into(),
            stations.iter().map(|s| s.location.1).collect::<Vec<f64>>(),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_conversion() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(date_to_days(epoch), 0);
        assert_eq!(days_to_date(0), Some(epoch));

        let date = NaiveDate::from_ymd_opt(2021, 7, 14).unwrap();
        assert_eq!(days_to_date(date_to_days(date)), Some(date));
    }

    #[test]
    fn test_measurement_frame_types() -> Result<(), Box<dyn std::error::Error>> {
        let measurements = vec![Measurement {
            station_id: "0000012345".to_string(),
            year: 2021,
            month: 7,
            date: NaiveDate::from_ymd_opt(2021, 7, 14).unwrap(),
            day_in_year: 195,
            value: 254.31,
        }];
        let df = measurements_to_frame(&measurements)?;
        assert_eq!(df.column("date")?.dtype(), &DataType::Date);
        assert_eq!(df.column("year")?.dtype(), &DataType::Int64);
        assert_eq!(measurements_from_frame(&df)?, measurements);
        Ok(())
    }

    #[test]
    fn test_missing_value_reports_row() -> Result<(), Box<dyn std::error::Error>> {
        let df = DataFrame::new(vec![
            Column::new("jahr".into(), vec![Some(2020i64), None]),
            Column::new("date".into(), vec![18262i32, 18263]).cast(&DataType::Date)?,
            Column::new("precipitation".into(), vec![1.5f64, 0.0]),
        ])?;
        let err = precipitation_from_frame(&df, "Basel-Binningen").unwrap_err();
        assert!(matches!(
            err,
            StoreError::UnexpectedData {
                table: Table::Precipitation,
                row: 1,
                ..
            }
        ));
        Ok(())
    }
}
