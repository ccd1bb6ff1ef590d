//! Turning free text into a structured query intent.
//!
//! Extraction runs in priority order and the first stage that produces an
//! answer wins:
//!
//! 1. type-list requests ("what types are supported?"),
//! 2. proximity queries (`<A> with nearby <B>`, `<A> near <B>`, ...),
//! 3. simple queries naming one or more categories.
//!
//! Category names are never hard-coded; tokens are matched against the
//! [`CategoryRegistry`] of the loaded dataset.
use std::{sync::Arc, time::Duration};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::analysis::{AnalysisError, PhraseAnalysis, STOP_WORDS, TextAnalyzer};

pub use error::ExtractionError;
use error::Result;

mod category;
mod patterns;

pub use category::{CategoryRegistry, display_name, plural, singular, token_matches_category};
pub use patterns::{ProximitySplit, is_type_list_request, split_proximity};

/// Verbs people use to phrase a request; never attributes.
pub const QUERY_VERBS: &[&str] = &[
    "show", "find", "get", "list", "display", "search", "locate", "give", "tell",
];

/// Structured interpretation of a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Intent {
    /// The user asked which categories exist.
    TypeListRequest,
    SimpleQuery {
        types: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        attributes: Vec<String>,
    },
    ProximityQuery {
        target_type: String,
        nearby_type: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        target_attributes: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        nearby_attributes: Vec<String>,
    },
    /// No category could be recognised.
    Unrecognized,
}

/// One side of a proximity query.
#[derive(Debug)]
struct ResolvedSegment {
    category: String,
    attributes: Vec<String>,
}

/// Maps raw queries to [`Intent`]s using a pluggable [`TextAnalyzer`].
#[derive(Clone)]
pub struct IntentExtractor {
    analyzer: Arc<dyn TextAnalyzer>,
}

impl std::fmt::Debug for IntentExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentExtractor")
            .field("analyzer_ready", &self.analyzer.is_ready())
            .finish()
    }
}

impl IntentExtractor {
    pub fn new(analyzer: Arc<dyn TextAnalyzer>) -> Self {
        Self { analyzer }
    }

    pub fn analyzer(&self) -> &Arc<dyn TextAnalyzer> {
        &self.analyzer
    }

    /// Interpret `query` against the categories in `registry`.
    #[instrument(name = "Analyze Query", level = "debug", skip(self, registry))]
    pub async fn analyze(&self, query: &str, registry: &CategoryRegistry) -> Result<Intent> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Intent::Unrecognized);
        }

        if is_type_list_request(query) {
            debug!("Detected type-list request");
            return Ok(Intent::TypeListRequest);
        }

        if let Some(split) = split_proximity(query) {
            let left = self.resolve_segment(split.left, registry).await?;
            let right = self.resolve_segment(split.right, registry).await?;
            match (left, right) {
                (Some(target), Some(nearby)) => {
                    let intent = Intent::ProximityQuery {
                        target_type: target.category,
                        nearby_type: nearby.category,
                        target_attributes: target.attributes,
                        nearby_attributes: nearby.attributes,
                    };
                    debug!(relation = split.relation, ?intent, "Detected proximity query");
                    return Ok(intent);
                }
                _ => debug!(
                    relation = split.relation,
                    "Proximity pattern matched but a side did not resolve to a category"
                ),
            }
        }

        let phrase = self.phrase(query).await?;
        let types = match_categories(&phrase.nouns, registry);
        if types.is_empty() {
            debug!(nouns = ?phrase.nouns, "No category recognised");
            return Ok(Intent::Unrecognized);
        }
        let intent = Intent::SimpleQuery {
            types,
            attributes: clean_attributes(&phrase.adjectives, registry),
        };
        debug!(?intent, "Detected simple query");
        Ok(intent)
    }

    /// [`analyze`](Self::analyze) bounded by `budget`. A late result is
    /// dropped.
    pub async fn analyze_with_timeout(
        &self,
        query: &str,
        registry: &CategoryRegistry,
        budget: Duration,
    ) -> Result<Intent> {
        tokio::time::timeout(budget, self.analyze(query, registry))
            .await
            .map_err(|_| ExtractionError::Timeout { budget })?
    }

    async fn resolve_segment(
        &self,
        segment: &str,
        registry: &CategoryRegistry,
    ) -> Result<Option<ResolvedSegment>> {
        let phrase = self.phrase(segment).await?;
        let Some(category) = phrase
            .nouns
            .iter()
            .find_map(|noun| registry.match_token(noun))
        else {
            return Ok(None);
        };
        Ok(Some(ResolvedSegment {
            category: category.to_string(),
            attributes: clean_attributes(&phrase.adjectives, registry),
        }))
    }

    /// Nouns and adjectives of `segment`; an analyzer that is not ready
    /// contributes nothing.
    async fn phrase(&self, segment: &str) -> Result<PhraseAnalysis> {
        if !self.analyzer.is_ready() {
            warn!("Text analyzer not ready, treating phrase as empty");
            return Ok(PhraseAnalysis::default());
        }
        match self.analyzer.extract_phrase(segment).await {
            Ok(phrase) => Ok(phrase),
            Err(AnalysisError::NotReady) => Ok(PhraseAnalysis::default()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Categories named by `nouns`, deduplicated in first-match order.
pub fn match_categories(nouns: &[String], registry: &CategoryRegistry) -> Vec<String> {
    nouns
        .iter()
        .filter_map(|noun| registry.match_token(noun))
        .unique()
        .map(str::to_string)
        .collect()
}

/// Adjectives usable as attribute filters: lower-cased, without query verbs,
/// stop words or category terms, deduplicated.
pub fn clean_attributes(adjectives: &[String], registry: &CategoryRegistry) -> Vec<String> {
    adjectives
        .iter()
        .map(|word| word.trim().to_lowercase())
        .filter(|word| !word.is_empty())
        .filter(|word| !QUERY_VERBS.contains(&word.as_str()) && !STOP_WORDS.contains(&word.as_str()))
        .filter(|word| !registry.is_category_term(word))
        .unique()
        .collect()
}

mod error {
    use std::time::Duration;

    use thiserror::Error;

    use crate::analysis::AnalysisError;

    #[derive(Error, Debug)]
    pub enum ExtractionError {
        #[error("Text analysis failed: {0}")]
        Analysis(#[from] AnalysisError),
        #[error("Intent extraction timed out after {}ms", budget.as_millis())]
        Timeout { budget: Duration },
    }
    pub type Result<T> = std::result::Result<T, ExtractionError>;
}
