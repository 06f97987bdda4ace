pub mod borehole;
pub mod extent;
pub mod measurement;
pub mod monthly_table;
pub mod station;
pub mod year_range;
