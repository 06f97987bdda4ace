use serde::{Deserialize, Serialize};

/// Year and value bounds of a set of measurements, used to size chart axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueExtent {
    pub min_year: i32,
    pub max_year: i32,
    pub min_value: f64,
    pub max_value: f64,
}
