//! Dataset layer for the `nearby` query library.
//!
//! A dataset is a list of points of interest plus the vocabulary of POI types
//! that queries are matched against. This crate owns its wire format
//! ([`RawDataset`]), the validation that turns it into a trusted [`Dataset`],
//! and the [`DatasetSource`] abstraction over where the document comes from.
use std::path::PathBuf;

use once_cell::sync::Lazy;
use tracing::warn;

pub mod embedded;
mod error;
pub mod processed;
pub mod raw;
mod source;
pub mod test_data;

pub use error::{DataError, Result, ValidationError};
pub use processed::{Coordinate, Dataset, Poi, QualityWarning};
pub use raw::{RawDataset, RawLocation, RawPoi, parse_dataset, read_dataset_file};
#[cfg(feature = "download_data")]
pub use source::HttpSource;
pub use source::{
    DATASET_ENV_VAR, DataSource, DatasetSource, EmbeddedSource, JsonFileSource, StaticSource,
};
pub use test_data::{TestDataConfig, create_test_dataset, write_test_dataset};

pub const DATA_DIR_DEFAULT: &str = "./nearby_data";

/// Directory holding local dataset files, from `DATA_DIR` or the default.
pub static DATA_DIR: Lazy<PathBuf> = Lazy::new(|| {
    let dir = std::env::var("DATA_DIR").unwrap_or_else(|_| DATA_DIR_DEFAULT.to_string());
    let dir = PathBuf::from(dir);
    if !dir.exists() {
        warn!(data_dir = ?dir, "Data directory does not exist");
    }
    dir
});

/// Default location of the dataset file inside [`DATA_DIR`].
pub fn default_dataset_path() -> PathBuf {
    DATA_DIR.join("pois.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dataset_path_is_json_file() {
        let path = default_dataset_path();
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("pois.json"));
    }
}
