//! Text-analysis capability used by intent extraction.
//!
//! The query pipeline needs exactly two things from a text analyzer: whether it
//! is ready, and the nouns and adjectives of a phrase. Anything that can answer
//! those (a local language model, a remote API, the rule-based
//! [`LexiconAnalyzer`]) can be plugged in through [`TextAnalyzer`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use error::AnalysisError;
mod lexicon;

pub(crate) use lexicon::STOP_WORDS;
pub use lexicon::LexiconAnalyzer;

/// Nouns and adjectives extracted from a phrase, in the order they appear.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseAnalysis {
    pub nouns: Vec<String>,
    pub adjectives: Vec<String>,
}

impl PhraseAnalysis {
    pub fn is_empty(&self) -> bool {
        self.nouns.is_empty() && self.adjectives.is_empty()
    }
}

/// A pluggable noun/adjective extractor.
///
/// `extract_phrase` may be slow (a model call, a network round trip); callers
/// bound it with a timeout rather than expecting implementations to do so.
#[async_trait]
pub trait TextAnalyzer: Send + Sync {
    /// Whether the analyzer can serve requests yet.
    fn is_ready(&self) -> bool;

    async fn extract_phrase(&self, segment: &str) -> Result<PhraseAnalysis, AnalysisError>;
}

mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum AnalysisError {
        #[error("Text analyzer is not ready")]
        NotReady,
        #[error("Text analysis failed: {0}")]
        Failed(String),
        #[error(transparent)]
        Other(#[from] anyhow::Error),
    }
}
