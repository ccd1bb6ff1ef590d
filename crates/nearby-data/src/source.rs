//! Where datasets come from.
//!
//! The query pipeline only needs something that can produce a [`RawDataset`];
//! whether that is a file on disk, a document compiled into the binary or a
//! remote endpoint is decided here.
use std::{fmt, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tracing::info;

use crate::{
    embedded,
    error::Result,
    raw::{RawDataset, read_dataset_file},
    test_data::{TestDataConfig, create_test_dataset},
};

/// Environment variable naming the dataset to load (a file path, an
/// `http(s)://` URL, `embedded` or `test`).
pub const DATASET_ENV_VAR: &str = "NEARBY_DATASET";

/// Asynchronous provider of a raw POI dataset.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Human-readable name used in logs and error messages.
    fn name(&self) -> String;

    async fn fetch(&self) -> Result<RawDataset>;
}

#[async_trait]
impl<S: DatasetSource + ?Sized> DatasetSource for Arc<S> {
    fn name(&self) -> String {
        (**self).name()
    }

    async fn fetch(&self) -> Result<RawDataset> {
        (**self).fetch().await
    }
}

/// Dataset stored as a JSON document on the local filesystem.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DatasetSource for JsonFileSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<RawDataset> {
        read_dataset_file(&self.path).await
    }
}

/// Dataset already held in memory.
#[derive(Debug, Clone)]
pub struct StaticSource {
    dataset: RawDataset,
}

impl StaticSource {
    pub fn new(dataset: RawDataset) -> Self {
        Self { dataset }
    }
}

#[async_trait]
impl DatasetSource for StaticSource {
    fn name(&self) -> String {
        "in-memory dataset".to_string()
    }

    async fn fetch(&self) -> Result<RawDataset> {
        Ok(self.dataset.clone())
    }
}

/// The sample dataset compiled into the library.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedSource;

#[async_trait]
impl DatasetSource for EmbeddedSource {
    fn name(&self) -> String {
        format!("embedded dataset v{}", embedded::METADATA.version)
    }

    async fn fetch(&self) -> Result<RawDataset> {
        embedded::load_embedded_dataset()
    }
}

/// Dataset served over HTTP(S).
#[cfg(feature = "download_data")]
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

#[cfg(feature = "download_data")]
impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[cfg(feature = "download_data")]
#[async_trait]
impl DatasetSource for HttpSource {
    fn name(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<RawDataset> {
        crate::raw::fetch::download_dataset(&self.client, &self.url).await
    }
}

/// Selection of the built-in dataset sources.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DataSource {
    /// Sample dataset that ships with the library
    #[default]
    Embedded,
    /// JSON file on disk
    File(PathBuf),
    /// JSON document at an HTTP(S) URL (requires the `download_data` feature)
    Url(String),
    /// Generated test data
    Test(TestDataConfig),
}

impl DataSource {
    /// Read the source from `NEARBY_DATASET`. When unset, a `pois.json` in the
    /// data directory is used if present, otherwise the embedded dataset.
    pub fn from_env() -> Self {
        match std::env::var(DATASET_ENV_VAR) {
            Ok(value) if !value.trim().is_empty() => Self::parse(&value),
            _ => {
                let path = crate::default_dataset_path();
                if path.exists() {
                    Self::File(path)
                } else {
                    Self::Embedded
                }
            }
        }
    }

    /// Interpret a dataset locator string.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("embedded") {
            Self::Embedded
        } else if value.eq_ignore_ascii_case("test") {
            Self::Test(TestDataConfig::sample())
        } else if value.starts_with("http://") || value.starts_with("https://") {
            Self::Url(value.to_string())
        } else {
            Self::File(PathBuf::from(value))
        }
    }

    /// Build the concrete source for this selection.
    pub fn into_source(self) -> Arc<dyn DatasetSource> {
        info!(data_source = %self, "Selecting dataset source");
        match self {
            Self::Embedded => Arc::new(EmbeddedSource),
            Self::File(path) => Arc::new(JsonFileSource::new(path)),
            Self::Test(config) => Arc::new(StaticSource::new(create_test_dataset(&config))),
            Self::Url(url) => url_source(url),
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Embedded => write!(f, "embedded"),
            Self::File(path) => write!(f, "file:{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
            Self::Test(_) => write!(f, "test"),
        }
    }
}

#[cfg(feature = "download_data")]
fn url_source(url: String) -> Arc<dyn DatasetSource> {
    Arc::new(HttpSource::new(url))
}

#[cfg(not(feature = "download_data"))]
fn url_source(url: String) -> Arc<dyn DatasetSource> {
    Arc::new(UnavailableSource { url })
}

/// Stand-in for URL sources when downloading is compiled out; always fails
/// with a retryable fetch error.
#[cfg(not(feature = "download_data"))]
#[derive(Debug, Clone)]
struct UnavailableSource {
    url: String,
}

#[cfg(not(feature = "download_data"))]
#[async_trait]
impl DatasetSource for UnavailableSource {
    fn name(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<RawDataset> {
        Err(crate::DataError::Fetch {
            source_name: self.url.clone(),
            reason: "download_data feature is disabled".to_string(),
        })
    }
}
