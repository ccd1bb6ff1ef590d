//! Query orchestration for the nearby library.
//!
//! This module provides [`QueryOrchestrator`], the single entry point a UI
//! calls: it sequences intent extraction, repository lookups and proximity
//! matching, and shapes everything into a [`QueryResult`].
//!
//! # Quick Start
//!
//! ```rust
//! use nearby::{QueryOrchestrator, QueryResult};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! // Embedded sample data and the built-in lexicon analyzer
//! let orchestrator = QueryOrchestrator::builder().build();
//!
//! match orchestrator.process_query("cafes near museums").await {
//!     QueryResult::Grouped { groups, .. } => println!("{} cafes", groups.len()),
//!     other => println!("{other}"),
//! }
//! # });
//! ```
use std::{panic::AssertUnwindSafe, sync::Arc};

use futures::FutureExt;
pub use nearby_data::DataSource;
use nearby_data::DatasetSource;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    analysis::{LexiconAnalyzer, TextAnalyzer},
    config::QueryConfig,
    error::Result,
    intent::{ExtractionError, Intent, IntentExtractor},
    proximity::{apply_attribute_filter, find_nearby},
    repository::PoiRepository,
    response::QueryResult,
};

/// Turns free-text queries into [`QueryResult`]s.
///
/// Services are injected rather than global, so independent orchestrators
/// (for example one per test) never share state. Clones share the same
/// repository and therefore the same loaded dataset.
///
/// # Examples
///
/// ```rust
/// use nearby::{DataSource, QueryConfigBuilder, QueryOrchestrator, TestDataConfig};
///
/// let orchestrator = QueryOrchestrator::builder()
///     .data_source(DataSource::Test(TestDataConfig::minimal()))
///     .config(QueryConfigBuilder::walking().build())
///     .build();
/// assert_eq!(orchestrator.config().threshold_miles, 0.5);
/// ```
#[derive(Clone)]
pub struct QueryOrchestrator {
    repository: Arc<PoiRepository>,
    extractor: IntentExtractor,
    config: QueryConfig,
}

impl std::fmt::Debug for QueryOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryOrchestrator")
            .field("repository", &self.repository)
            .field("extractor", &self.extractor)
            .field("config", &self.config)
            .finish()
    }
}

impl QueryOrchestrator {
    pub fn new(
        repository: Arc<PoiRepository>,
        analyzer: Arc<dyn TextAnalyzer>,
        config: QueryConfig,
    ) -> Self {
        Self {
            repository,
            extractor: IntentExtractor::new(analyzer),
            config,
        }
    }

    pub fn builder() -> QueryOrchestratorBuilder {
        QueryOrchestratorBuilder::new()
    }

    /// Dataset from `NEARBY_DATASET`, settings from `NEARBY_THRESHOLD_MILES`
    /// and `NEARBY_EXTRACTION_TIMEOUT_MS`, lexicon analyzer.
    pub fn from_env() -> Result<Self> {
        Ok(Self::builder()
            .data_source(DataSource::from_env())
            .config(QueryConfig::from_env()?)
            .build())
    }

    pub fn repository(&self) -> &Arc<PoiRepository> {
        &self.repository
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Load the dataset ahead of the first query. Returns the number of POIs.
    #[instrument(name = "Warm Up QueryOrchestrator", level = "info", skip(self))]
    pub async fn warm_up(&self) -> Result<usize> {
        let dataset = self.repository.load().await?;
        info!(pois = dataset.len(), "Dataset ready");
        Ok(dataset.len())
    }

    /// Process one free-text query.
    ///
    /// Never fails: load problems, timeouts and even panics inside the
    /// pipeline come back as [`QueryResult::Error`].
    #[instrument(name = "Process Query", level = "info", skip(self))]
    pub async fn process_query(&self, raw: &str) -> QueryResult {
        match AssertUnwindSafe(self.run_pipeline(raw)).catch_unwind().await {
            Ok(result) => {
                debug!(kind = result.kind(), "Query processed");
                result
            }
            Err(_) => {
                error!("Query pipeline panicked");
                QueryResult::internal_error()
            }
        }
    }

    async fn run_pipeline(&self, raw: &str) -> QueryResult {
        let query = raw.trim();
        if query.is_empty() {
            return QueryResult::generic_guidance();
        }

        if !self.extractor.analyzer().is_ready() {
            info!("Text analyzer not ready yet");
            return QueryResult::still_initializing();
        }

        // the registry of supported types is needed for extraction
        if let Err(e) = self.repository.load().await {
            warn!(error = %e, "Dataset load failed");
            return if e.is_validation() {
                QueryResult::malformed_data(&e.to_string())
            } else {
                QueryResult::data_unavailable(&e.to_string())
            };
        }
        let registry = self.repository.registry();

        let intent = match self
            .extractor
            .analyze_with_timeout(query, &registry, self.config.extraction_timeout)
            .await
        {
            Ok(intent) => intent,
            Err(ExtractionError::Timeout { budget }) => {
                warn!(budget_ms = budget.as_millis(), "Intent extraction timed out");
                return QueryResult::timed_out(budget);
            }
            Err(e) => {
                warn!(error = %e, "Intent extraction failed, falling back to suggestions");
                Intent::Unrecognized
            }
        };
        debug!(?intent, "Extracted intent");

        match intent {
            Intent::TypeListRequest => QueryResult::TypesList {
                types: self.repository.supported_types(),
            },
            Intent::Unrecognized => QueryResult::unrecognized(
                registry.types(),
                self.config.suggestion_type_count,
            ),
            Intent::ProximityQuery {
                target_type,
                nearby_type,
                target_attributes,
                nearby_attributes,
            } => self.proximity_query(
                target_type,
                nearby_type,
                &target_attributes,
                &nearby_attributes,
            ),
            Intent::SimpleQuery { types, attributes } => self.simple_query(&types, &attributes),
        }
    }

    fn proximity_query(
        &self,
        target_type: String,
        nearby_type: String,
        target_attributes: &[String],
        nearby_attributes: &[String],
    ) -> QueryResult {
        let threshold_miles = self.config.threshold_miles;
        let targets = apply_attribute_filter(
            self.repository.query_by_types(&[target_type.as_str()]),
            target_attributes,
        );
        let candidates = apply_attribute_filter(
            self.repository.query_by_types(&[nearby_type.as_str()]),
            nearby_attributes,
        );

        let mut groups = find_nearby(&targets, &candidates, threshold_miles);
        if groups.is_empty() {
            return QueryResult::no_proximity_matches(
                &target_type,
                &nearby_type,
                target_attributes,
                nearby_attributes,
                threshold_miles,
            );
        }
        if let Some(limit) = self.config.max_results {
            groups.truncate(limit);
        }
        QueryResult::Grouped {
            groups,
            target_type,
            nearby_type,
            threshold_miles,
        }
    }

    fn simple_query(&self, types: &[String], attributes: &[String]) -> QueryResult {
        let mut pois = apply_attribute_filter(self.repository.query_by_types(types), attributes);
        if pois.is_empty() {
            return QueryResult::no_simple_matches(types, attributes);
        }
        if let Some(limit) = self.config.max_results {
            pois.truncate(limit);
        }
        QueryResult::Success { pois }
    }
}

/// Builder for creating a [`QueryOrchestrator`] with custom services.
///
/// Unset parts default to the embedded dataset, the [`LexiconAnalyzer`] and
/// [`QueryConfig::default`].
#[derive(Default)]
pub struct QueryOrchestratorBuilder {
    data_source: Option<DataSource>,
    source: Option<Arc<dyn DatasetSource>>,
    repository: Option<Arc<PoiRepository>>,
    analyzer: Option<Arc<dyn TextAnalyzer>>,
    config: Option<QueryConfig>,
}

impl QueryOrchestratorBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load data from one of the built-in sources.
    #[must_use]
    pub fn data_source(mut self, source: DataSource) -> Self {
        self.data_source = Some(source);
        self
    }

    /// Load data from a custom source. Takes precedence over `data_source`.
    #[must_use]
    pub fn source(mut self, source: Arc<dyn DatasetSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Share an existing repository. Takes precedence over any source.
    #[must_use]
    pub fn repository(mut self, repository: Arc<PoiRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Set the text analyzer.
    #[must_use]
    pub fn analyzer(mut self, analyzer: Arc<dyn TextAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    #[must_use]
    pub fn config(mut self, config: QueryConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the `QueryOrchestrator`.
    pub fn build(self) -> QueryOrchestrator {
        let repository = self.repository.unwrap_or_else(|| {
            let source = self
                .source
                .unwrap_or_else(|| self.data_source.unwrap_or_default().into_source());
            Arc::new(PoiRepository::new(source))
        });
        let analyzer = self
            .analyzer
            .unwrap_or_else(|| Arc::new(LexiconAnalyzer::new()));

        QueryOrchestrator::new(repository, analyzer, self.config.unwrap_or_default())
    }
}
