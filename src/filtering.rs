use crate::store::schema::STATION_COLUMN;
use crate::types::year_range::YearRange;
use polars::prelude::{col, lit, LazyFrame};

pub trait GroundwaterFrameFilterExt {
    /// Keeps only the rows of one station.
    /// Assumes a string 'stationnr' column.
    fn filter_station(self, station_id: &str) -> LazyFrame;

    /// Keeps rows whose year column lies within `years` (inclusive on both ends).
    ///
    /// # Arguments
    /// * `year_column`: Name of the integer year column ("year" for measurements,
    ///   "jahr" for precipitation).
    /// * `years`: The inclusive range of years to keep.
    fn filter_years(self, year_column: &str, years: YearRange) -> LazyFrame;
}

impl GroundwaterFrameFilterExt for LazyFrame {
    fn filter_station(self, station_id: &str) -> LazyFrame {
        self.filter(col(STATION_COLUMN).eq(lit(station_id.to_string())))
    }

    fn filter_years(self, year_column: &str, years: YearRange) -> LazyFrame {
        self.filter(
            col(year_column)
                .gt_eq(lit(years.start() as i64))
                .and(col(year_column).lt_eq(lit(years.end() as i64))),
        )
    }
}
