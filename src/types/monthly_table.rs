//! Contains the `MonthlyAverageTable`, the year × month pivot of a station's
//! average water levels as shown in the dashboard's table tab.

use polars::prelude::{Column, DataFrame, PolarsResult};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Month column headers, always in calendar order.
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Placeholder rendered for a month without observations.
pub const MISSING_CELL: &str = "-";

/// One year of the pivot: the mean water level per calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAverageRow {
    pub year: i32,
    /// Index 0 is January. `None` when the month has no observations.
    pub means: [Option<f64>; 12],
}

impl MonthlyAverageRow {
    /// Formatted cell for `month` (1-12): two decimals or [`MISSING_CELL`].
    pub fn cell(&self, month: u32) -> String {
        match month
            .checked_sub(1)
            .and_then(|i| self.means.get(i as usize))
            .copied()
            .flatten()
        {
            Some(mean) => format!("{:.2}", mean),
            None => MISSING_CELL.to_string(),
        }
    }

    /// All twelve formatted cells, January first.
    pub fn cells(&self) -> Vec<String> {
        (1..=12).map(|month| self.cell(month)).collect()
    }
}

/// Average water level per (year, month) of one station, pivoted so that each
/// row is a year (ascending) and each column a calendar month.
///
/// Only years that have at least one measurement get a row; gaps between years
/// are not filled with empty rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MonthlyAverageTable {
    pub rows: Vec<MonthlyAverageRow>,
}

impl MonthlyAverageTable {
    /// Builds the pivot from `(year, month, mean)` triples. Months outside 1-12 are ignored.
    pub fn from_means(means: impl IntoIterator<Item = (i32, u32, f64)>) -> Self {
        let mut by_year: BTreeMap<i32, [Option<f64>; 12]> = BTreeMap::new();
        for (year, month, mean) in means {
            if !(1..=12).contains(&month) {
                continue;
            }
            by_year.entry(year).or_insert([None; 12])[(month - 1) as usize] = Some(mean);
        }
        Self {
            rows: by_year
                .into_iter()
                .map(|(year, means)| MonthlyAverageRow { year, means })
                .collect(),
        }
    }

    /// Column headers: `year` followed by the twelve month abbreviations.
    pub fn header() -> Vec<&'static str> {
        std::iter::once("year")
            .chain(MONTH_ABBREVIATIONS.iter().copied())
            .collect()
    }

    pub fn years(&self) -> Vec<i32> {
        self.rows.iter().map(|row| row.year).collect()
    }

    pub fn row(&self, year: i32) -> Option<&MonthlyAverageRow> {
        self.rows.iter().find(|row| row.year == year)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Converts the formatted table into a `DataFrame` of string cells with an
    /// integer `year` column, ready for a tabular widget.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let mut columns = Vec::with_capacity(13);
        columns.push(Column::new(
            "year".into(),
            self.rows.iter().map(|row| row.year).collect::<Vec<i32>>(),
        ));
        for (i, abbreviation) in MONTH_ABBREVIATIONS.iter().enumerate() {
            let cells: Vec<String> = self
                .rows
                .iter()
                .map(|row| row.cell(i as u32 + 1))
                .collect();
            columns.push(Column::new((*abbreviation).into(), cells));
        }
        DataFrame::new(columns)
    }
}

impl fmt::Display for MonthlyAverageTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>4}", "year")?;
        for abbreviation in MONTH_ABBREVIATIONS {
            write!(f, " {:>8}", abbreviation)?;
        }
        writeln!(f)?;
        for row in &self.rows {
            write!(f, "{:>4}", row.year)?;
            for cell in row.cells() {
                write!(f, " {:>8}", cell)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
