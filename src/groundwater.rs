//! This module provides the main entry point of the crate: [`Groundwater`], an
//! in-memory, read-only view of the groundwater store that answers the
//! dashboard's queries (station lists, year lists, monthly pivots, filtered
//! series, extents and borehole metadata).

use crate::config::GroundwaterConfig;
use crate::error::GroundwaterError;
use crate::filtering::GroundwaterFrameFilterExt;
use crate::store::error::StoreError;
use crate::store::extract::{measurements_from_frame, precipitation_from_frame, stations_from_frame};
use crate::store::loader::TableLoader;
use crate::store::schema::{pad_station_code, Table, BOREHOLE_KEY_COLUMN};
use crate::types::borehole::{BoreholeField, BoreholeInfo};
use crate::types::extent::ValueExtent;
use crate::types::measurement::{Measurement, PrecipitationReading};
use crate::types::monthly_table::{MonthlyAverageTable, MISSING_CELL};
use crate::types::station::{LatLon, Station};
use crate::types::year_range::YearRange;
use log::{debug, info, warn};
use polars::prelude::*;
use std::collections::{BTreeSet, HashMap};

/// The loaded groundwater store and its query operations.
///
/// All four tables are read once by [`Groundwater::load`] and never modified
/// afterwards. Every query works on a fresh lazy copy of the loaded frames, so a
/// single instance can be shared between dashboard sessions (it is `Send + Sync`).
///
/// # Examples
///
/// ```no_run
/// use groundwater::{Groundwater, GroundwaterConfig, GroundwaterError, YearRange};
///
/// # fn main() -> Result<(), GroundwaterError> {
/// let config = GroundwaterConfig::builder().data_dir("app/data").build();
/// let groundwater = Groundwater::load(&config)?;
///
/// for (name, id) in groundwater.stations() {
///     println!("{name} ({id}): {:?}", groundwater.years_for_station(id)?);
/// }
///
/// let series = groundwater.filtered_series("0000012345", YearRange::new(2019, 2021)?)?;
/// println!("{} readings", series.len());
/// # Ok(())
/// # }
/// ```
pub struct Groundwater {
    measurements: DataFrame,
    stations: Vec<Station>,
    station_index: HashMap<String, usize>,
    /// `(name, id)` pairs sorted by name, for selection widgets.
    station_names: Vec<(String, String)>,
    boreholes: DataFrame,
    precipitation: DataFrame,
    /// Distinct years over all stations, newest first.
    years: Vec<i32>,
    reference_station_label: String,
}

impl Groundwater {
    /// Loads all store tables described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`GroundwaterError::Store`] if any table file is missing, cannot
    /// be read, lacks a required column, holds values that cannot be converted
    /// to the expected types, or if the station table lists an id twice. A
    /// store that fails to load is unusable; there is no partial instance.
    pub fn load(config: &GroundwaterConfig) -> Result<Self, GroundwaterError> {
        let loader = TableLoader::new(config.csv_separator);
        let measurements = loader.load(Table::Measurements, &config.path(Table::Measurements))?;
        let station_frame = loader.load(Table::Stations, &config.path(Table::Stations))?;
        let boreholes = loader.load(Table::Boreholes, &config.path(Table::Boreholes))?;
        let precipitation = loader.load(Table::Precipitation, &config.path(Table::Precipitation))?;

        let stations = stations_from_frame(&station_frame)?;
        let mut station_index = HashMap::with_capacity(stations.len());
        for (i, station) in stations.iter().enumerate() {
            if station_index.insert(station.id.clone(), i).is_some() {
                return Err(StoreError::DuplicateStation(station.id.clone()).into());
            }
        }

        let mut station_names: Vec<(String, String)> = stations
            .iter()
            .map(|station| (station.name.clone(), station.id.clone()))
            .collect();
        station_names.sort();

        let years = distinct_years_descending(&measurements)?;

        info!(
            "Loaded groundwater store: {} stations, {} measurements, years {:?}-{:?}",
            stations.len(),
            measurements.height(),
            years.last(),
            years.first()
        );

        Ok(Self {
            measurements,
            stations,
            station_index,
            station_names,
            boreholes,
            precipitation,
            years,
            reference_station_label: config.reference_station_label.clone(),
        })
    }

    /// `(name, id)` pairs of all stations, sorted by name (then id).
    ///
    /// Names are not unique, so this is a list rather than a map.
    pub fn stations(&self) -> &[(String, String)] {
        &self.station_names
    }

    /// The station record of `station_id`, `None` if it is not in the station table.
    pub fn station(&self, station_id: &str) -> Option<&Station> {
        self.station_index
            .get(station_id)
            .map(|&i| &self.stations[i])
    }

    /// Distinct years with measurements across all stations, newest first.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// The earliest year in the store, `None` for an empty measurement table.
    pub fn min_year(&self) -> Option<i32> {
        self.years.last().copied()
    }

    /// The latest year in the store, `None` for an empty measurement table.
    pub fn max_year(&self) -> Option<i32> {
        self.years.first().copied()
    }

    /// Distinct years in which `station_id` has at least one measurement, newest
    /// first. Empty for a station without data.
    pub fn years_for_station(&self, station_id: &str) -> Result<Vec<i32>, GroundwaterError> {
        let df = self
            .measurements
            .clone()
            .lazy()
            .filter_station(station_id)
            .select([col("year")])
            .collect()?;
        distinct_years_descending(&df).map_err(GroundwaterError::from)
    }

    /// Display name of a station.
    ///
    /// # Errors
    ///
    /// Returns [`GroundwaterError::StationNotFound`] for ids missing from the
    /// station table; validate ids against [`Groundwater::stations`] first.
    pub fn station_name(&self, station_id: &str) -> Result<&str, GroundwaterError> {
        self.station(station_id)
            .map(|station| station.name.as_str())
            .ok_or_else(|| GroundwaterError::StationNotFound(station_id.to_string()))
    }

    /// Location of a station. Same not-found contract as [`Groundwater::station_name`].
    pub fn station_coordinates(&self, station_id: &str) -> Result<LatLon, GroundwaterError> {
        self.station(station_id)
            .map(|station| station.location)
            .ok_or_else(|| GroundwaterError::StationNotFound(station_id.to_string()))
    }

    /// Mean water level per year and month for one station, pivoted into a
    /// year × month table (see [`MonthlyAverageTable`]).
    ///
    /// Only years with data get a row. A station without data yields an empty table.
    pub fn monthly_average_table(
        &self,
        station_id: &str,
    ) -> Result<MonthlyAverageTable, GroundwaterError> {
        debug!("Computing monthly averages for station {}", station_id);
        let df = self
            .measurements
            .clone()
            .lazy()
            .filter_station(station_id)
            .group_by([col("year"), col("month")])
            .agg([col("value").mean()])
            .collect()?;

        let years = df.column("year")?.i64()?;
        let months = df.column("month")?.i64()?;
        let means = df.column("value")?.f64()?;
        let triples = years
            .into_iter()
            .zip(months)
            .zip(means)
            .filter_map(|((year, month), mean)| {
                Some((
                    i32::try_from(year?).ok()?,
                    u32::try_from(month?).ok()?,
                    mean?,
                ))
            });
        Ok(MonthlyAverageTable::from_means(triples))
    }

    /// All measurements of `station_id` whose year lies in `years`, in the
    /// order they appear in the store (the store is written in date order).
    pub fn filtered_series(
        &self,
        station_id: &str,
        years: YearRange,
    ) -> Result<Vec<Measurement>, GroundwaterError> {
        debug!("Filtering series of station {} for {}", station_id, years);
        let df = self
            .measurements
            .clone()
            .lazy()
            .filter_station(station_id)
            .filter_years("year", years)
            .collect()?;
        Ok(measurements_from_frame(&df)?)
    }

    /// Precipitation of the reference gauge for `years` (inclusive on both ends).
    pub fn precipitation_series(
        &self,
        years: YearRange,
    ) -> Result<Vec<PrecipitationReading>, GroundwaterError> {
        let df = self
            .precipitation
            .clone()
            .lazy()
            .filter_years("jahr", years)
            .collect()?;
        Ok(precipitation_from_frame(&df, &self.reference_station_label)?)
    }

    /// Looks up the borehole record of a station.
    ///
    /// Station codes are compared after zero-padding, so a Kataster entry keyed
    /// `12345` matches station `0000012345`. Null cells are reported as `-`.
    ///
    /// Returns `Ok(None)` when no record exists, and an error when the record
    /// cannot be rendered as text.
    pub fn try_borehole_info(
        &self,
        station_id: &str,
    ) -> Result<Option<BoreholeInfo>, GroundwaterError> {
        let wanted = pad_station_code(station_id);
        let keys = self.boreholes.column(BOREHOLE_KEY_COLUMN)?.str()?;
        let Some(row) = keys
            .into_iter()
            .position(|key| key.is_some_and(|key| pad_station_code(key) == wanted))
        else {
            return Ok(None);
        };

        let record = self.boreholes.slice(row as i64, 1);
        let mut fields = Vec::with_capacity(record.width());
        for column in record.get_columns() {
            let text = column.cast(&DataType::String)?;
            let value = text
                .str()?
                .get(0)
                .map(str::to_string)
                .unwrap_or_else(|| MISSING_CELL.to_string());
            fields.push(BoreholeField {
                name: column.name().to_string(),
                value,
            });
        }
        Ok(Some(BoreholeInfo::new(fields)))
    }

    /// Borehole record of a station, or an empty [`BoreholeInfo`] when there is
    /// none or it cannot be read. Borehole metadata is supplementary, so this
    /// never fails.
    pub fn borehole_info(&self, station_id: &str) -> BoreholeInfo {
        match self.try_borehole_info(station_id) {
            Ok(Some(info)) => info,
            Ok(None) => {
                debug!("No borehole record for station {}", station_id);
                BoreholeInfo::default()
            }
            Err(e) => {
                warn!("Borehole lookup for station {} failed: {}", station_id, e);
                BoreholeInfo::default()
            }
        }
    }

    /// Year and value bounds of one station's measurements, or of the whole
    /// store when `station_id` is `None`. `None` when there are no measurements.
    pub fn value_extent(
        &self,
        station_id: Option<&str>,
    ) -> Result<Option<ValueExtent>, GroundwaterError> {
        let mut lazy = self.measurements.clone().lazy();
        if let Some(station_id) = station_id {
            lazy = lazy.filter_station(station_id);
        }
        let df = lazy
            .select([
                col("year").min().alias("min_year"),
                col("year").max().alias("max_year"),
                col("value").min().alias("min_value"),
                col("value").max().alias("max_value"),
            ])
            .collect()?;

        let year = |name: &str| -> Result<Option<i32>, GroundwaterError> {
            Ok(df
                .column(name)?
                .i64()?
                .get(0)
                .and_then(|y| i32::try_from(y).ok()))
        };
        let value = |name: &str| -> Result<Option<f64>, GroundwaterError> {
            Ok(df.column(name)?.f64()?.get(0))
        };

        Ok(
            match (
                year("min_year")?,
                year("max_year")?,
                value("min_value")?,
                value("max_value")?,
            ) {
                (Some(min_year), Some(max_year), Some(min_value), Some(max_value)) => {
                    Some(ValueExtent {
                        min_year,
                        max_year,
                        min_value,
                        max_value,
                    })
                }
                _ => None,
            },
        )
    }
}

fn distinct_years_descending(df: &DataFrame) -> Result<Vec<i32>, StoreError> {
    let years: BTreeSet<i32> = df
        .column("year")
        .map_err(|_| StoreError::MissingColumn {
            table: Table::Measurements,
            column: "year".to_string(),
        })?
        .i64()?
        .into_iter()
        .flatten()
        .filter_map(|year| i32::try_from(year).ok())
        .collect();
    Ok(years.into_iter().rev().collect())
}
