//! Defines the groundwater monitoring station and its geographic location.

use serde::{Deserialize, Serialize};

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
/// Both values are represented as `f64` decimal degrees.
///
/// # Examples
///
/// ```
/// use groundwater::LatLon;
///
/// let basel_muenster = LatLon(47.5565, 7.5925);
/// assert_eq!(basel_muenster.latitude(), 47.5565);
/// assert_eq!(basel_muenster.longitude(), 7.5925);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon(pub f64, pub f64);

impl LatLon {
    pub fn latitude(&self) -> f64 {
        self.0
    }

    pub fn longitude(&self) -> f64 {
        self.1
    }
}

/// A single groundwater monitoring station as listed in the station table.
///
/// The display `name` is not unique across stations; always key on `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// The zero-padded, ten character station code (e.g. "0000012345").
    pub id: String,
    /// Human readable station name, e.g. "Lange Erlen".
    pub name: String,
    /// Location of the well head.
    pub location: LatLon,
}
