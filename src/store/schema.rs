//! Describes the four tables of the groundwater store: their role, the columns
//! a reader must provide, and the default file names derived from the dataset
//! identifier.

use std::fmt;

/// Station code column shared by the measurement and station tables.
pub const STATION_COLUMN: &str = "stationnr";
/// Station code column of the borehole (Kataster) table.
pub const BOREHOLE_KEY_COLUMN: &str = "catnum45";
/// Width station codes are zero-padded to.
pub const STATION_CODE_WIDTH: usize = 10;

/// One of the tables that make up the groundwater store.
///
/// Every table is loaded once when a [`crate::Groundwater`] is constructed and
/// must provide at least the columns returned by [`Table::required_columns`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// Daily mean water levels per station.
    Measurements,
    /// One row per station with display name and coordinates.
    Stations,
    /// Free-form Kataster metadata per borehole.
    Boreholes,
    /// Daily precipitation of the reference gauge.
    Precipitation,
}

impl Table {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Table::Measurements => "measurement",
            Table::Stations => "station",
            Table::Boreholes => "borehole",
            Table::Precipitation => "precipitation",
        }
    }

    /// Suffix appended to the dataset identifier to form the default file name.
    pub(crate) fn file_suffix(&self) -> &'static str {
        match self {
            Table::Measurements => "final",
            Table::Stations => "stations",
            Table::Boreholes => "boreholes",
            Table::Precipitation => "precipitation",
        }
    }

    pub(crate) fn default_file_name(&self, identifier: &str) -> String {
        format!("{}_{}.parquet", identifier, self.file_suffix())
    }

    pub(crate) fn required_columns(&self) -> Vec<&'static str> {
        match self {
            Table::Measurements => vec![
                STATION_COLUMN,
                "year",
                "month",
                "date",
                "day_in_year",
                "value",
            ],
            Table::Stations => vec![STATION_COLUMN, "stationname", "lat", "lon"],
            Table::Boreholes => vec![BOREHOLE_KEY_COLUMN],
            Table::Precipitation => vec!["jahr", "date", "precipitation"],
        }
    }
}

/// Formats a `Table` using its short name.
///
/// # Examples
///
/// ```
/// use groundwater::Table;
///
/// assert_eq!(Table::Stations.to_string(), "station");
/// ```
impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Left-pads a station code with zeros to [`STATION_CODE_WIDTH`] characters.
///
/// Codes already at or above the width are returned trimmed but otherwise unchanged.
///
/// # Examples
///
/// ```
/// use groundwater::pad_station_code;
///
/// assert_eq!(pad_station_code("12345"), "0000012345");
/// assert_eq!(pad_station_code(" 0000012345 "), "0000012345");
/// ```
pub fn pad_station_code(code: &str) -> String {
    format!("{:0>width$}", code.trim(), width = STATION_CODE_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_file_names_follow_identifier() {
        assert_eq!(
            Table::Measurements.default_file_name("100064"),
            "100064_final.parquet"
        );
        assert_eq!(
            Table::Stations.default_file_name("100064"),
            "100064_stations.parquet"
        );
    }

    #[test]
    fn test_measurement_columns_include_derived_fields() {
        let columns = Table::Measurements.required_columns();
        for derived in ["year", "month", "date", "day_in_year"] {
            assert!(columns.contains(&derived), "missing {}", derived);
        }
    }

    #[test]
    fn test_pad_station_code_leaves_long_codes() {
        assert_eq!(pad_station_code("12345678901"), "12345678901");
        assert_eq!(pad_station_code(""), "0000000000");
    }
}
