//! In-memory POI repository with a lazily loaded, memoized dataset.
//!
//! The dataset is fetched from a [`DatasetSource`] on first use. Concurrent
//! callers that arrive while a load is in flight await the same shared future
//! instead of issuing their own fetch; a failed load leaves the slot empty so
//! the next caller starts over.
use std::{panic::AssertUnwindSafe, sync::Arc};

use futures::{
    FutureExt,
    future::{BoxFuture, Shared},
};
use nearby_data::{DataError, Dataset, DatasetSource, Poi, QualityWarning};
use parking_lot::Mutex;
use tracing::{info, instrument, warn};

use crate::intent::CategoryRegistry;

pub use error::RepositoryError;

type LoadResult = Result<Arc<Dataset>, RepositoryError>;
type SharedLoad = Shared<BoxFuture<'static, LoadResult>>;

enum LoadState {
    Empty,
    Loading(SharedLoad),
    Loaded(Arc<Dataset>),
}

/// Holds the dataset and answers type-filtered lookups.
///
/// Lookups made before the dataset has loaded see an empty repository; call
/// [`load`](Self::load) first.
pub struct PoiRepository {
    source: Arc<dyn DatasetSource>,
    state: Mutex<LoadState>,
}

impl std::fmt::Debug for PoiRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoiRepository")
            .field("source", &self.source.name())
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl PoiRepository {
    pub fn new(source: Arc<dyn DatasetSource>) -> Self {
        Self {
            source,
            state: Mutex::new(LoadState::Empty),
        }
    }

    /// Name of the underlying dataset source.
    pub fn source_name(&self) -> String {
        self.source.name()
    }

    /// Load the dataset, or return it if already loaded.
    ///
    /// The lock is only held to inspect or swap the slot, never across the
    /// fetch itself.
    pub async fn load(&self) -> LoadResult {
        let pending = {
            let mut state = self.state.lock();
            match &*state {
                LoadState::Loaded(dataset) => return Ok(Arc::clone(dataset)),
                LoadState::Loading(pending) => pending.clone(),
                LoadState::Empty => {
                    let pending = fetch_dataset(Arc::clone(&self.source)).boxed().shared();
                    *state = LoadState::Loading(pending.clone());
                    pending
                }
            }
        };

        let result = pending.clone().await;

        let mut state = self.state.lock();
        // Only the load we awaited may settle the slot
        if matches!(&*state, LoadState::Loading(current) if current.ptr_eq(&pending)) {
            *state = match &result {
                Ok(dataset) => LoadState::Loaded(Arc::clone(dataset)),
                Err(_) => LoadState::Empty,
            };
        }
        result
    }

    /// The loaded dataset, if any.
    pub fn dataset(&self) -> Option<Arc<Dataset>> {
        match &*self.state.lock() {
            LoadState::Loaded(dataset) => Some(Arc::clone(dataset)),
            _ => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(&*self.state.lock(), LoadState::Loaded(_))
    }

    /// POIs whose type equals one of `types`, ignoring case, in dataset order.
    /// Empty before the dataset has loaded.
    pub fn query_by_types<S: AsRef<str>>(&self, types: &[S]) -> Vec<Poi> {
        if types.is_empty() {
            return Vec::new();
        }
        let Some(dataset) = self.dataset() else {
            return Vec::new();
        };
        dataset
            .pois()
            .iter()
            .filter(|poi| types.iter().any(|t| poi.is_type(t.as_ref())))
            .cloned()
            .collect()
    }

    /// Copy of the dataset's canonical category list, in declared order.
    pub fn supported_types(&self) -> Vec<String> {
        self.dataset()
            .map(|dataset| dataset.supported_types().to_vec())
            .unwrap_or_default()
    }

    /// Snapshot of the supported categories for intent extraction.
    pub fn registry(&self) -> CategoryRegistry {
        CategoryRegistry::new(self.supported_types())
    }

    pub fn poi_count(&self) -> usize {
        self.dataset().map_or(0, |dataset| dataset.len())
    }

    pub fn find_by_id(&self, id: &str) -> Option<Poi> {
        self.dataset()?
            .pois()
            .iter()
            .find(|poi| poi.id == id)
            .cloned()
    }

    pub fn quality_warnings(&self) -> Vec<QualityWarning> {
        self.dataset()
            .map(|dataset| dataset.quality_warnings().to_vec())
            .unwrap_or_default()
    }
}

#[instrument(name = "Load Dataset", level = "info", skip_all, fields(source = %source.name()))]
async fn fetch_dataset(source: Arc<dyn DatasetSource>) -> LoadResult {
    let fetched = AssertUnwindSafe(source.fetch()).catch_unwind().await;
    let raw = match fetched {
        Ok(result) => result?,
        Err(_) => {
            return Err(DataError::Fetch {
                source_name: source.name(),
                reason: "dataset source panicked".to_string(),
            }
            .into());
        }
    };

    let dataset = Dataset::from_raw(raw).map_err(DataError::from)?;
    if !dataset.quality_warnings().is_empty() {
        warn!(
            count = dataset.quality_warnings().len(),
            "Dataset loaded with data quality warnings"
        );
    }
    info!(pois = dataset.len(), "Dataset loaded");
    Ok(Arc::new(dataset))
}

mod error {
    use std::sync::Arc;

    use nearby_data::DataError;
    use thiserror::Error;

    /// A dataset load failure, shared by every caller that awaited the load.
    #[derive(Error, Debug, Clone)]
    #[error(transparent)]
    pub struct RepositoryError(Arc<DataError>);

    impl RepositoryError {
        pub fn inner(&self) -> &DataError {
            &self.0
        }

        /// The dataset itself is malformed; retrying will not help.
        pub fn is_validation(&self) -> bool {
            matches!(*self.0, DataError::Validation(_))
        }

        pub fn is_retryable(&self) -> bool {
            self.0.is_retryable()
        }
    }

    impl From<DataError> for RepositoryError {
        fn from(error: DataError) -> Self {
            Self(Arc::new(error))
        }
    }
}
