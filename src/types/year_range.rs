use crate::error::GroundwaterError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::ops::RangeInclusive;

/// An inclusive range of calendar years, e.g. the selection of a year slider.
///
/// A range can only be constructed with `start <= end`; a reversed selection is
/// rejected instead of silently matching nothing.
///
/// # Examples
///
/// ```
/// use groundwater::YearRange;
///
/// let range = YearRange::new(2019, 2021)?;
/// assert_eq!(range.years().collect::<Vec<_>>(), vec![2019, 2020, 2021]);
/// assert!(range.contains(2021));
/// assert!(YearRange::new(2021, 2019).is_err());
/// # Ok::<(), groundwater::GroundwaterError>(())
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearRange {
    start: i32,
    end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Result<Self, GroundwaterError> {
        if start > end {
            return Err(GroundwaterError::InvalidYearRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// A range covering one year only.
    pub fn single(year: i32) -> Self {
        Self {
            start: year,
            end: year,
        }
    }

    pub fn start(self) -> i32 {
        self.start
    }

    pub fn end(self) -> i32 {
        self.end
    }

    /// The explicit set of years in the range, ascending.
    pub fn years(self) -> RangeInclusive<i32> {
        self.start..=self.end
    }

    pub fn contains(self, year: i32) -> bool {
        self.start <= year && year <= self.end
    }
}

impl Display for YearRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:04}", self.start, self.end)
    }
}
