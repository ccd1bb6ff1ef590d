use std::fmt;

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both components are finite and inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude_is_valid() && self.longitude_is_valid()
    }

    pub fn latitude_is_valid(&self) -> bool {
        self.latitude.is_finite() && (-90.0..=90.0).contains(&self.latitude)
    }

    pub fn longitude_is_valid(&self) -> bool {
        self.longitude.is_finite() && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.latitude, self.longitude)
    }
}

/// A validated point of interest.
///
/// The `type` is an open vocabulary: it is only checked against the dataset's
/// `supportedTypes` at query time, never against a fixed list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub poi_type: String,
    pub location: Coordinate,
    pub address: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
}

impl Poi {
    pub fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }

    /// Case-insensitive comparison of this POI's type with `poi_type`, using
    /// the same Unicode folding as the supported-type check at validation.
    pub fn is_type(&self, poi_type: &str) -> bool {
        self.poi_type.trim().to_lowercase() == poi_type.trim().to_lowercase()
    }
}

impl fmt::Display for Poi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] - {}", self.name, self.poi_type, self.address)
    }
}
