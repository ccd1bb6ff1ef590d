use std::io::Write;

use tempfile::NamedTempFile;
use tracing::info;

use super::error::Result;
use crate::raw::{RawDataset, RawPoi};

const TEST_TYPES: [&str; 6] = [
    "park",
    "restaurant",
    "cafe",
    "museum",
    "library",
    "gas_station",
];

const TEST_ATTRIBUTES: [&[&str]; 6] = [
    &["dog friendly", "playground"],
    &["italian", "outdoor seating"],
    &["wifi", "pastries"],
    &["art", "free"],
    &["quiet"],
    &[],
];

/// Configuration for test data generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestDataConfig {
    /// Number of POI categories to generate (capped at the built-in list)
    pub type_count: usize,
    /// Number of POIs per category
    pub pois_per_type: usize,
    /// Distance between neighbouring grid points, in thousandths of a degree
    pub spacing_millidegrees: u32,
    /// Whether to attach realistic attribute tags
    pub realistic_data: bool,
}

impl Default for TestDataConfig {
    fn default() -> Self {
        Self {
            type_count: TEST_TYPES.len(),
            pois_per_type: 5,
            spacing_millidegrees: 10,
            realistic_data: true,
        }
    }
}

impl TestDataConfig {
    /// One park at (0, 0) and one restaurant at (0, 0.01), about 0.69 miles apart.
    pub fn minimal() -> Self {
        Self {
            type_count: 2,
            pois_per_type: 1,
            spacing_millidegrees: 10,
            realistic_data: false,
        }
    }

    /// Sample data for integration tests
    pub fn sample() -> Self {
        Self::default()
    }
}

/// Build a deterministic dataset from the configuration.
///
/// POI `i` of category `t` is placed at latitude `i * spacing` and longitude
/// `t * spacing`, so every category forms a column of the grid and POIs with
/// the same index sit one spacing step apart across categories.
pub fn create_test_dataset(config: &TestDataConfig) -> RawDataset {
    info!("Creating test data with config: {:?}", config);

    let type_count = config.type_count.clamp(1, TEST_TYPES.len());
    let spacing = f64::from(config.spacing_millidegrees) / 1000.0;

    let supported_types = TEST_TYPES[..type_count]
        .iter()
        .map(ToString::to_string)
        .collect();

    let mut pois = Vec::with_capacity(type_count * config.pois_per_type);
    for (type_idx, poi_type) in TEST_TYPES[..type_count].iter().enumerate() {
        for i in 0..config.pois_per_type {
            let location = (i as f64 * spacing, type_idx as f64 * spacing);
            let mut poi = if config.realistic_data {
                RawPoi::new(
                    format!("{poi_type}-{i:03}"),
                    format!("{} {}", title_case(poi_type), i + 1),
                    *poi_type,
                    location,
                    format!("{} Test Street", 100 + i),
                )
            } else {
                let name = char::from(b'A' + (type_idx * config.pois_per_type + i) as u8 % 26);
                RawPoi::new(
                    format!("{poi_type}-{i}"),
                    name.to_string(),
                    *poi_type,
                    location,
                    "Test Address",
                )
            };
            if config.realistic_data && !TEST_ATTRIBUTES[type_idx].is_empty() {
                poi = poi.with_attributes(TEST_ATTRIBUTES[type_idx].iter().copied());
            }
            pois.push(poi);
        }
    }

    RawDataset {
        supported_types,
        pois,
    }
}

/// Write a generated dataset to a temporary JSON file.
pub fn write_test_dataset(config: &TestDataConfig) -> Result<NamedTempFile> {
    let dataset = create_test_dataset(config);
    let mut file = NamedTempFile::with_suffix(".json")?;
    serde_json::to_writer_pretty(&mut file, &dataset)?;
    file.flush()?;
    Ok(file)
}

fn title_case(poi_type: &str) -> String {
    poi_type
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dataset, raw::read_dataset_file};

    #[test]
    fn test_minimal_dataset_layout() {
        let raw = create_test_dataset(&TestDataConfig::minimal());
        assert_eq!(raw.supported_types, vec!["park", "restaurant"]);
        assert_eq!(raw.pois.len(), 2);

        let dataset = Dataset::from_raw(raw).unwrap();
        let park = &dataset.pois()[0];
        let restaurant = &dataset.pois()[1];
        assert_eq!(park.name, "A");
        assert_eq!(park.poi_type, "park");
        assert_eq!((park.location.latitude, park.location.longitude), (0.0, 0.0));
        assert_eq!(restaurant.name, "B");
        assert_eq!(
            (restaurant.location.latitude, restaurant.location.longitude),
            (0.0, 0.01)
        );
        assert!(restaurant.attributes.is_empty());
    }

    #[test]
    fn test_sample_dataset_validates() {
        let config = TestDataConfig::sample();
        let dataset = Dataset::from_raw(create_test_dataset(&config)).unwrap();
        assert_eq!(dataset.len(), config.type_count * config.pois_per_type);
        assert!(dataset.quality_warnings().is_empty());
        assert!(
            dataset
                .pois()
                .iter()
                .any(|poi| poi.attributes.contains(&"italian".to_string()))
        );
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("gas_station"), "Gas Station");
        assert_eq!(title_case("park"), "Park");
    }

    #[tokio::test]
    async fn test_write_test_dataset_round_trip() {
        let config = TestDataConfig::minimal();
        let file = write_test_dataset(&config).unwrap();
        let raw = read_dataset_file(file.path()).await.unwrap();
        assert_eq!(raw, create_test_dataset(&config));
    }
}
