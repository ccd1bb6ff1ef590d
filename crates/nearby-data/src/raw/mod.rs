//! The loosely-typed wire shape of a POI dataset.
//!
//! Every field a POI needs is optional here so that a missing value is reported
//! by validation with the offending index and field name, instead of surfacing
//! as an opaque deserialization error.
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

#[cfg(feature = "download_data")]
pub mod fetch;

pub use super::error::Result;

/// Dataset document as delivered by a [`DatasetSource`](crate::DatasetSource).
///
/// ```json
/// {
///   "supportedTypes": ["park", "restaurant"],
///   "pois": [
///     {"id": "p1", "name": "Green Park", "type": "park",
///      "location": {"latitude": 51.5, "longitude": -0.14},
///      "address": "London", "attributes": ["dog friendly"]}
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDataset {
    pub supported_types: Vec<String>,
    pub pois: Vec<RawPoi>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPoi {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub poi_type: Option<String>,
    pub location: Option<RawLocation>,
    pub address: Option<String>,
    pub attributes: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLocation {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl RawPoi {
    /// Convenience constructor for a fully populated record.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        poi_type: impl Into<String>,
        (latitude, longitude): (f64, f64),
        address: impl Into<String>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            poi_type: Some(poi_type.into()),
            location: Some(RawLocation {
                latitude: Some(latitude),
                longitude: Some(longitude),
            }),
            address: Some(address.into()),
            attributes: None,
        }
    }

    #[must_use]
    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = Some(attributes.into_iter().map(Into::into).collect());
        self
    }
}

/// Parse a dataset document from JSON text.
///
/// Syntax errors and wrongly-typed values (for example a string latitude) are
/// reported as [`ValidationError::Malformed`](crate::ValidationError::Malformed).
pub fn parse_dataset(json: &str) -> Result<RawDataset> {
    serde_json::from_str(json).map_err(From::from)
}

/// Read and parse a dataset document from disk.
#[instrument(name = "Read dataset file", skip_all, level = "info")]
pub async fn read_dataset_file(path: impl AsRef<Path>) -> Result<RawDataset> {
    let path = path.as_ref();
    info!(path = ?path, "Reading dataset file");
    let contents = tokio::fs::read_to_string(path).await?;
    parse_dataset(&contents)
}
