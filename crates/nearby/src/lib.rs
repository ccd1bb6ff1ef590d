//! Nearby - Natural-Language Point-of-Interest Search
//!
//! Nearby answers free-text requests such as "parks with nearby restaurants"
//! against a small POI dataset. A query is turned into a structured intent
//! (which categories, which attribute filters, whether a spatial relation was
//! asked for), the matching POIs are looked up, and for proximity queries each
//! target is paired with the POIs of the other category within a distance
//! threshold, closest first.
//!
//! # Quick Start
//!
//! ```rust
//! use nearby::{QueryOrchestrator, QueryResult};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! // Embedded San Francisco sample data, rule-based analyzer, 1.5 mile threshold
//! let orchestrator = QueryOrchestrator::builder().build();
//!
//! if let QueryResult::Grouped { groups, .. } =
//!     orchestrator.process_query("cafes near museums").await
//! {
//!     for group in &groups {
//!         for nearby in &group.nearby {
//!             println!(
//!                 "{} -> {} ({})",
//!                 group.target.name,
//!                 nearby.poi.name,
//!                 nearby.formatted_distance()
//!             );
//!         }
//!     }
//! }
//! # });
//! ```
//!
//! # Features
//!
//! - **Pluggable analysis**: any [`TextAnalyzer`] (local model, remote API,
//!   the built-in [`LexiconAnalyzer`]) can drive intent extraction
//! - **Open vocabulary**: categories come from the dataset, not from code
//! - **Proximity matching**: haversine distances, threshold filtering and
//!   attribute filters on either side of the relation
//! - **Robust orchestration**: timeouts, load failures and panics all come back
//!   as a [`QueryResult`], never as an unhandled error
//!
//! # Data
//!
//! A sample dataset is embedded in the library. Other datasets are read from
//! JSON files, fetched over HTTP (feature `download_data`) or supplied through
//! a custom [`DatasetSource`].
use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

pub mod analysis;
mod config;
mod core;
pub mod error;
pub mod geo;
pub mod intent;
pub mod proximity;
pub mod repository;
mod response;

pub use crate::core::{DataSource, QueryOrchestrator, QueryOrchestratorBuilder};

pub use analysis::{AnalysisError, LexiconAnalyzer, PhraseAnalysis, TextAnalyzer};
pub use config::{QueryConfig, QueryConfigBuilder};
pub use error::NearbyError;
pub use intent::{CategoryRegistry, ExtractionError, Intent, IntentExtractor};
pub use nearby_data as data;
pub use nearby_data::{
    Coordinate, DataError, Dataset, DatasetSource, EmbeddedSource, JsonFileSource, Poi,
    RawDataset, RawPoi, StaticSource, TestDataConfig,
};
pub use proximity::{NearbyPoi, ProximityGroup, filter_by_attributes, find_nearby};
pub use repository::{PoiRepository, RepositoryError};
pub use response::QueryResult;

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for the nearby library.
///
/// Installs a `tracing` fmt subscriber. `RUST_LOG` takes precedence over
/// `level` when set. Safe to call more than once.
///
/// # Examples
///
/// ```rust
/// use nearby::init_logging;
/// use tracing::Level;
///
/// init_logging(Level::INFO)?;
/// # Ok::<(), nearby::error::NearbyError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static (), NearbyError> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?
            .add_directive("reqwest=warn".parse()?)
            .add_directive("hyper_util=warn".parse()?);

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .try_init()
            .map_err(|e| NearbyError::Other(anyhow::anyhow!(e)))?;
        Ok(())
    })
}
