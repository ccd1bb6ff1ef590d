use std::collections::HashSet;

use itertools::Itertools;
use tracing::{info, instrument, warn};

use crate::{
    ValidationError,
    raw::{RawDataset, RawPoi},
};

mod poi;

pub use poi::{Coordinate, Poi};

/// Non-fatal data-quality findings raised while validating a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualityWarning {
    /// The POI's type is not listed in `supportedTypes`, so no query will ever
    /// match it.
    UnsupportedType { poi_id: String, poi_type: String },
}

impl std::fmt::Display for QualityWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedType { poi_id, poi_type } => write!(
                f,
                "POI `{poi_id}` has type `{poi_type}` which is not in supportedTypes"
            ),
        }
    }
}

/// A validated, immutable POI dataset.
///
/// The only way to build one is through validation of a [`RawDataset`], so
/// every `Dataset` satisfies the structural invariants: a non-empty type
/// vocabulary, unique POI ids, all required fields present and coordinates in
/// range.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    supported_types: Vec<String>,
    pois: Vec<Poi>,
    quality_warnings: Vec<QualityWarning>,
}

impl Dataset {
    #[instrument(name = "Validate Dataset", skip_all, level = "info")]
    pub fn from_raw(raw: RawDataset) -> Result<Self, ValidationError> {
        let RawDataset {
            supported_types,
            pois,
        } = raw;

        if supported_types.is_empty() {
            return Err(ValidationError::EmptySupportedTypes);
        }
        if let Some(index) = supported_types.iter().position(|t| t.trim().is_empty()) {
            return Err(ValidationError::BlankSupportedType { index });
        }

        let mut seen_ids = HashSet::with_capacity(pois.len());
        let pois = pois
            .into_iter()
            .enumerate()
            .map(|(index, raw_poi)| {
                let poi = validate_poi(index, raw_poi)?;
                if seen_ids.insert(poi.id.clone()) {
                    Ok(poi)
                } else {
                    Err(ValidationError::DuplicateId { id: poi.id })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        // same comparison as type lookups, so a POI without a warning is reachable
        let quality_warnings = pois
            .iter()
            .filter(|poi| !supported_types.iter().any(|t| poi.is_type(t)))
            .map(|poi| QualityWarning::UnsupportedType {
                poi_id: poi.id.clone(),
                poi_type: poi.poi_type.clone(),
            })
            .collect::<Vec<_>>();

        for warning in &quality_warnings {
            warn!("Data quality: {warning}");
        }
        info!(
            pois = pois.len(),
            supported_types = supported_types.len(),
            warnings = quality_warnings.len(),
            "Dataset validated"
        );

        Ok(Self {
            supported_types,
            pois,
            quality_warnings,
        })
    }

    /// The canonical category vocabulary, in dataset order.
    pub fn supported_types(&self) -> &[String] {
        &self.supported_types
    }

    pub fn pois(&self) -> &[Poi] {
        &self.pois
    }

    pub fn quality_warnings(&self) -> &[QualityWarning] {
        &self.quality_warnings
    }

    pub fn len(&self) -> usize {
        self.pois.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pois.is_empty()
    }

    /// Distinct POI types present in the data, in first-seen order.
    pub fn present_types(&self) -> Vec<&str> {
        self.pois
            .iter()
            .map(|poi| poi.poi_type.as_str())
            .unique()
            .collect()
    }
}

impl TryFrom<RawDataset> for Dataset {
    type Error = ValidationError;

    fn try_from(raw: RawDataset) -> Result<Self, Self::Error> {
        Self::from_raw(raw)
    }
}

fn required(
    index: usize,
    field: &'static str,
    value: Option<String>,
) -> Result<String, ValidationError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ValidationError::MissingField { index, field })
}

fn validate_poi(index: usize, raw: RawPoi) -> Result<Poi, ValidationError> {
    let id = required(index, "id", raw.id)?;
    let name = required(index, "name", raw.name)?;
    let poi_type = required(index, "type", raw.poi_type)?;
    let address = required(index, "address", raw.address)?;

    let location = raw.location.ok_or(ValidationError::MissingField {
        index,
        field: "location",
    })?;
    let latitude = location.latitude.ok_or(ValidationError::MissingField {
        index,
        field: "location.latitude",
    })?;
    let longitude = location.longitude.ok_or(ValidationError::MissingField {
        index,
        field: "location.longitude",
    })?;

    let location = Coordinate::new(latitude, longitude);
    if !location.latitude_is_valid() {
        return Err(ValidationError::InvalidCoordinate {
            id,
            field: "latitude",
            value: latitude,
        });
    }
    if !location.longitude_is_valid() {
        return Err(ValidationError::InvalidCoordinate {
            id,
            field: "longitude",
            value: longitude,
        });
    }

    Ok(Poi {
        id,
        name,
        poi_type,
        location,
        address,
        attributes: raw.attributes.unwrap_or_default(),
    })
}
