use once_cell::sync::Lazy;

use crate::{
    error::Result,
    raw::{RawDataset, parse_dataset},
};

// Sample dataset shipped with the library
const EMBEDDED_DATASET: &str = include_str!("pois.json");

/// Description of the embedded dataset.
#[derive(Debug, Clone)]
pub struct EmbeddedMetadata {
    pub version: &'static str,
    pub description: &'static str,
    pub poi_count: usize,
    pub type_count: usize,
}

pub static METADATA: Lazy<EmbeddedMetadata> = Lazy::new(|| {
    let (poi_count, type_count) = parse_dataset(EMBEDDED_DATASET)
        .map(|raw| (raw.pois.len(), raw.supported_types.len()))
        .unwrap_or_default();
    EmbeddedMetadata {
        version: env!("CARGO_PKG_VERSION"),
        description: "Sample San Francisco points of interest",
        poi_count,
        type_count,
    }
});

/// Load the embedded dataset that ships with the library.
pub fn load_embedded_dataset() -> Result<RawDataset> {
    tracing::info!("Loading embedded dataset from built-in data");
    parse_dataset(EMBEDDED_DATASET)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dataset;

    #[test]
    fn test_embedded_dataset_is_valid() {
        let raw = load_embedded_dataset().expect("Embedded dataset should parse");
        let dataset = Dataset::from_raw(raw).expect("Embedded dataset should validate");

        assert!(dataset.len() > 20, "Embedded data should not be trivial");
        assert!(
            dataset.quality_warnings().is_empty(),
            "Embedded data should only use supported types: {:?}",
            dataset.quality_warnings()
        );
    }

    #[test]
    fn test_metadata_matches_dataset() {
        let raw = load_embedded_dataset().unwrap();
        assert_eq!(METADATA.poi_count, raw.pois.len());
        assert_eq!(METADATA.type_count, raw.supported_types.len());
    }
}
