//! Chart configuration and axis-domain computation for the dashboard's time
//! series plots. Rendering is left to the presentation layer; this module only
//! decides what the axes should span and how dates are labelled.

use crate::error::GroundwaterError;
use crate::types::measurement::{Measurement, PrecipitationReading};
use bon::bon;
use chrono::{Months, NaiveDate};
use ordered_float::OrderedFloat;
use serde::Serialize;

/// Margin added above and below the water level range.
pub const WATER_LEVEL_PADDING: f64 = 1.0;
/// Margin added above the largest precipitation value.
pub const PRECIPITATION_PADDING: f64 = 10.0;
/// Precipitation axes always start here.
pub const PRECIPITATION_FLOOR: f64 = 0.0;
/// Spans longer than this many calendar months are labelled by year only.
pub const COARSE_LABEL_SPAN_MONTHS: u32 = 5 * 12;

/// The kind of series being plotted; decides the default y-axis padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SeriesKind {
    WaterLevel,
    Precipitation,
}

impl SeriesKind {
    /// Default y-domain for data ranging from `min` to `max`.
    pub fn padded_domain(self, min: f64, max: f64) -> (f64, f64) {
        match self {
            SeriesKind::WaterLevel => (min - WATER_LEVEL_PADDING, max + WATER_LEVEL_PADDING),
            SeriesKind::Precipitation => (PRECIPITATION_FLOOR, max + PRECIPITATION_PADDING),
        }
    }
}

/// How dates on the x-axis are labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LabelGranularity {
    /// `2021`
    Year,
    /// `2021-06`
    YearMonth,
}

impl LabelGranularity {
    /// Year labels for spans of more than five years, year-month labels otherwise.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use groundwater::LabelGranularity;
    ///
    /// let start = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();
    /// let end = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    /// assert_eq!(LabelGranularity::for_span(start, end), LabelGranularity::Year);
    /// assert_eq!(LabelGranularity::for_span(start, start), LabelGranularity::YearMonth);
    /// ```
    pub fn for_span(start: NaiveDate, end: NaiveDate) -> Self {
        let (first, last) = if start <= end { (start, end) } else { (end, start) };
        match first.checked_add_months(Months::new(COARSE_LABEL_SPAN_MONTHS)) {
            Some(limit) if last <= limit => LabelGranularity::YearMonth,
            _ => LabelGranularity::Year,
        }
    }

    /// `strftime` pattern of the labels.
    pub fn format(self) -> &'static str {
        match self {
            LabelGranularity::Year => "%Y",
            LabelGranularity::YearMonth => "%Y-%m",
        }
    }

    pub fn label(self, date: NaiveDate) -> String {
        date.format(self.format()).to_string()
    }
}

/// Smallest and largest finite value, `None` if there are none.
pub fn value_range(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .map(OrderedFloat)
        .fold(None, |range, v| match range {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .map(|(lo, hi)| (lo.into_inner(), hi.into_inner()))
}

/// The axes a chart should be drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedChart {
    /// `None` when neither settings nor data provide dates.
    pub x_domain: Option<(NaiveDate, NaiveDate)>,
    /// `None` when neither settings nor data provide values.
    pub y_domain: Option<(f64, f64)>,
    pub granularity: LabelGranularity,
}

/// Settings of one time series chart.
///
/// `x`, `y` and `color` name fields of the plotted records. Optional domains
/// override the ones computed from the data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSettings {
    pub x: String,
    pub y: String,
    pub color: String,
    pub title: String,
    pub x_domain: Option<(NaiveDate, NaiveDate)>,
    pub y_domain: Option<(f64, f64)>,
}

#[bon]
impl ChartSettings {
    /// Creates validated chart settings.
    ///
    /// # Errors
    ///
    /// Returns [`GroundwaterError::InvalidChartSettings`] if `x` or `y` is blank,
    /// if `x_domain` ends before it starts, or if `y_domain` is not a finite,
    /// non-empty interval.
    ///
    /// # Examples
    ///
    /// ```
    /// use groundwater::ChartSettings;
    ///
    /// let settings = ChartSettings::builder()
    ///     .x("day_in_year")
    ///     .y("value")
    ///     .title("Lange Erlen")
    ///     .y_domain((250.0, 260.0))
    ///     .build()?;
    /// assert_eq!(settings.color, "year");
    ///
    /// assert!(ChartSettings::builder().x("date").y("value").y_domain((3.0, 1.0)).build().is_err());
    /// # Ok::<(), groundwater::GroundwaterError>(())
    /// ```
    #[builder]
    pub fn new(
        #[builder(into)] x: String,
        #[builder(into)] y: String,
        #[builder(into, default = "year".to_string())] color: String,
        #[builder(into, default = String::new())] title: String,
        x_domain: Option<(NaiveDate, NaiveDate)>,
        y_domain: Option<(f64, f64)>,
    ) -> Result<Self, GroundwaterError> {
        if x.trim().is_empty() || y.trim().is_empty() {
            return Err(GroundwaterError::InvalidChartSettings(
                "x and y fields must be named".to_string(),
            ));
        }
        if let Some((start, end)) = x_domain {
            if start > end {
                return Err(GroundwaterError::InvalidChartSettings(format!(
                    "x domain ends ({end}) before it starts ({start})"
                )));
            }
        }
        if let Some((lo, hi)) = y_domain {
            if !lo.is_finite() || !hi.is_finite() || lo >= hi {
                return Err(GroundwaterError::InvalidChartSettings(format!(
                    "y domain [{lo}, {hi}] is not a finite, non-empty interval"
                )));
            }
        }
        Ok(Self {
            x,
            y,
            color,
            title,
            x_domain,
            y_domain,
        })
    }

    /// Water level over calendar date, coloured by year.
    pub fn water_level(title: impl Into<String>) -> Self {
        Self {
            x: "date".to_string(),
            y: "value".to_string(),
            color: "year".to_string(),
            title: title.into(),
            x_domain: None,
            y_domain: None,
        }
    }

    /// Water level over day of year, one line per year.
    pub fn day_of_year(title: impl Into<String>) -> Self {
        Self {
            x: "day_in_year".to_string(),
            ..Self::water_level(title)
        }
    }

    /// Reference gauge precipitation over calendar date.
    pub fn precipitation(title: impl Into<String>) -> Self {
        Self {
            x: "date".to_string(),
            y: "precipitation_mm".to_string(),
            color: "reference_station_label".to_string(),
            title: title.into(),
            x_domain: None,
            y_domain: None,
        }
    }

    /// Resolves the axes for `points` (`(date, value)` pairs), preferring the
    /// explicit domains of these settings.
    pub fn resolve(
        &self,
        kind: SeriesKind,
        points: impl IntoIterator<Item = (NaiveDate, f64)>,
    ) -> ResolvedChart {
        let (dates, values): (Vec<NaiveDate>, Vec<f64>) = points.into_iter().unzip();

        let x_domain = self.x_domain.or_else(|| {
            let start = dates.iter().min()?;
            let end = dates.iter().max()?;
            Some((*start, *end))
        });
        let y_domain = self
            .y_domain
            .or_else(|| value_range(values).map(|(lo, hi)| kind.padded_domain(lo, hi)));
        let granularity = x_domain
            .map(|(start, end)| LabelGranularity::for_span(start, end))
            .unwrap_or(LabelGranularity::YearMonth);

        ResolvedChart {
            x_domain,
            y_domain,
            granularity,
        }
    }

    pub fn resolve_water_levels(&self, series: &[Measurement]) -> ResolvedChart {
        self.resolve(
            SeriesKind::WaterLevel,
            series.iter().map(|m| (m.date, m.value)),
        )
    }

    pub fn resolve_precipitation(&self, series: &[PrecipitationReading]) -> ResolvedChart {
        self.resolve(
            SeriesKind::Precipitation,
            series.iter().map(|r| (r.date, r.precipitation_mm)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_water_level_domain_is_padded() {
        let settings = ChartSettings::water_level("Lange Erlen");
        let chart = settings.resolve(
            SeriesKind::WaterLevel,
            vec![(date(2020, 1, 1), 251.5), (date(2020, 3, 1), 249.0)],
        );
        assert_eq!(chart.y_domain, Some((248.0, 252.5)));
        assert_eq!(chart.x_domain, Some((date(2020, 1, 1), date(2020, 3, 1))));
        assert_eq!(chart.granularity, LabelGranularity::YearMonth);
    }

    #[test]
    fn test_precipitation_domain_starts_at_floor() {
        let settings = ChartSettings::precipitation("Niederschlag");
        let readings = vec![
            PrecipitationReading {
                reference_station_label: "Basel-Binningen".to_string(),
                year: 2015,
                date: date(2015, 1, 1),
                precipitation_mm: 7.0,
            },
            PrecipitationReading {
                reference_station_label: "Basel-Binningen".to_string(),
                year: 2021,
                date: date(2021, 6, 1),
                precipitation_mm: 42.0,
            },
        ];
        let chart = settings.resolve_precipitation(&readings);
        assert_eq!(chart.y_domain, Some((PRECIPITATION_FLOOR, 52.0)));
        assert_eq!(chart.granularity, LabelGranularity::Year);
    }

    #[test]
    fn test_explicit_domains_win() -> Result<(), GroundwaterError> {
        let settings = ChartSettings::builder()
            .x("date")
            .y("value")
            .x_domain((date(2000, 1, 1), date(2001, 1, 1)))
            .y_domain((200.0, 300.0))
            .build()?;
        let chart = settings.resolve(SeriesKind::WaterLevel, vec![(date(2020, 1, 1), 1.0)]);
        assert_eq!(chart.y_domain, Some((200.0, 300.0)));
        assert_eq!(chart.x_domain, Some((date(2000, 1, 1), date(2001, 1, 1))));
        assert_eq!(chart.granularity, LabelGranularity::YearMonth);
        Ok(())
    }

    #[test]
    fn test_empty_series_has_no_domain() {
        let chart = ChartSettings::day_of_year("").resolve_water_levels(&[]);
        assert_eq!(chart.x_domain, None);
        assert_eq!(chart.y_domain, None);
        assert_eq!(chart.granularity, LabelGranularity::YearMonth);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        assert!(ChartSettings::builder().x(" ").y("value").build().is_err());
        assert!(ChartSettings::builder()
            .x("date")
            .y("value")
            .x_domain((date(2021, 1, 1), date(2020, 1, 1)))
            .build()
            .is_err());
        assert!(ChartSettings::builder()
            .x("date")
            .y("value")
            .y_domain((f64::NAN, 1.0))
            .build()
            .is_err());
    }

    #[test]
    fn test_granularity_threshold() {
        let start = date(2010, 1, 1);
        let exactly_five = date(2015, 1, 1);
        assert_eq!(
            LabelGranularity::for_span(start, exactly_five),
            LabelGranularity::YearMonth
        );
        let just_over = date(2015, 1, 2);
        assert_eq!(
            LabelGranularity::for_span(start, just_over),
            LabelGranularity::Year
        );
        assert_eq!(
            LabelGranularity::for_span(just_over, start),
            LabelGranularity::Year
        );
        assert_eq!(LabelGranularity::Year.label(just_over), "2015");
        assert_eq!(LabelGranularity::YearMonth.label(start), "2010-01");
    }

    #[test]
    fn test_five_years_with_two_leap_days_keep_month_labels() {
        // 2016-01-01..2021-01-01 spans 1827 days.
        assert_eq!(
            LabelGranularity::for_span(date(2016, 1, 1), date(2021, 1, 1)),
            LabelGranularity::YearMonth
        );
        assert_eq!(
            LabelGranularity::for_span(date(2016, 2, 29), date(2021, 2, 28)),
            LabelGranularity::YearMonth
        );
        assert_eq!(
            LabelGranularity::for_span(date(2016, 2, 29), date(2021, 3, 1)),
            LabelGranularity::Year
        );
    }

    #[test]
    fn test_value_range_skips_nan() {
        assert_eq!(value_range(vec![f64::NAN, 2.0, -1.0]), Some((-1.0, 2.0)));
        assert_eq!(value_range(Vec::new()), None);
    }
}
