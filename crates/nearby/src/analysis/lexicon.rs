use ahash::AHashSet as HashSet;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use super::{AnalysisError, PhraseAnalysis, TextAnalyzer};

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{L}\p{N}]+(?:['’-][\p{L}\p{N}]+)*|[,;:.!?]").expect("valid token regex")
});

/// Words that carry no category or attribute meaning in a POI query.
pub(crate) const STOP_WORDS: &[&str] = &[
    "a", "about", "all", "an", "and", "any", "are", "around", "at", "be", "by", "can", "close",
    "could", "do", "does", "for", "from", "have", "having", "here", "i", "in", "is", "it", "let",
    "like", "me", "my", "near", "nearby", "need", "of", "on", "one", "ones", "or", "place",
    "places", "please", "show", "some", "something", "spot", "spots", "that", "the", "there",
    "these", "thing", "things", "this", "those", "to", "us", "want", "we", "what", "where",
    "which", "with", "within", "would", "you", "find", "get", "list", "display", "search",
    "locate", "give", "tell", "looking", "look",
];

/// Common descriptive words that should be read as attributes.
const ADJECTIVES: &[&str] = &[
    "affordable", "authentic", "big", "busy", "cheap", "clean", "cozy", "covered", "crowded",
    "expensive", "family", "famous", "fancy", "fast", "free", "fresh", "good", "great", "hidden",
    "historic", "indoor", "large", "late", "local", "modern", "new", "old", "open", "organic",
    "outdoor", "popular", "pretty", "public", "quiet", "romantic", "scenic", "shaded", "small",
    "spicy", "top", "trendy", "vegan", "vegetarian", "wheelchair", "quick", "casual", "boutique",
    "friendly", "accessible", "best", "nice", "beautiful", "green", "mexican", "thai",
];

/// Words that look adjectival by suffix but are nouns in POI queries.
const NOUN_OVERRIDES: &[&str] = &[
    "cheese", "fish", "dish", "radish", "station", "stations", "pharmacy", "pharmacies",
    "library", "libraries", "museum", "museums", "clinic", "clinics", "music", "picnic",
];

const ADJECTIVE_SUFFIXES: &[&str] = &["ian", "ese", "ish", "ful", "ous", "ic", "free", "friendly"];
const MIN_SUFFIX_WORD_LEN: usize = 5;

/// Rule-based noun/adjective tagger.
///
/// Tokens are lower-cased and stop words dropped. A token is an adjective if it
/// is in the descriptive lexicon, is hyphenated (`dog-friendly`, `24-hour`), or
/// carries an adjectival suffix (`italian`, `japanese`, `organic`). Purely
/// numeric tokens are ignored and everything else is a noun. Runs of adjacent
/// nouns not separated by punctuation are also emitted joined, ahead of their
/// parts, so `coffee shop` can match a `coffee_shop` category exactly.
///
/// # Examples
///
/// ```rust
/// use nearby::{LexiconAnalyzer, TextAnalyzer};
///
/// # tokio_test_block(async {
/// let analyzer = LexiconAnalyzer::new();
/// let phrase = analyzer.extract_phrase("cheap italian restaurants").await?;
/// assert_eq!(phrase.nouns, vec!["restaurants"]);
/// assert_eq!(phrase.adjectives, vec!["cheap", "italian"]);
/// # Ok::<(), nearby::AnalysisError>(())
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LexiconAnalyzer {
    stop_words: HashSet<String>,
    adjectives: HashSet<String>,
    noun_overrides: HashSet<String>,
}

impl Default for LexiconAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconAnalyzer {
    pub fn new() -> Self {
        let to_set = |words: &[&str]| words.iter().map(|w| (*w).to_string()).collect();
        Self {
            stop_words: to_set(STOP_WORDS),
            adjectives: to_set(ADJECTIVES),
            noun_overrides: to_set(NOUN_OVERRIDES),
        }
    }

    /// Register extra words to be tagged as adjectives.
    #[must_use]
    pub fn with_adjectives<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.adjectives
            .extend(words.into_iter().map(|w| w.as_ref().trim().to_lowercase()));
        self
    }

    /// Register extra words to be ignored entirely.
    #[must_use]
    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stop_words
            .extend(words.into_iter().map(|w| w.as_ref().trim().to_lowercase()));
        self
    }

    fn is_adjective(&self, token: &str) -> bool {
        if self.noun_overrides.contains(token) {
            return false;
        }
        if self.adjectives.contains(token) || token.contains('-') {
            return true;
        }
        token.len() >= MIN_SUFFIX_WORD_LEN
            && ADJECTIVE_SUFFIXES
                .iter()
                .any(|suffix| token.ends_with(suffix))
    }

    /// Synchronous tagging, shared by the async trait method.
    pub fn tag(&self, segment: &str) -> PhraseAnalysis {
        let lowered = segment.to_lowercase();
        let mut analysis = PhraseAnalysis::default();
        let mut noun_run: Vec<&str> = Vec::new();

        for token in TOKEN_RE.find_iter(&lowered).map(|m| m.as_str()) {
            if self.stop_words.contains(token)
                || token.chars().all(|c| c.is_numeric() || c.is_ascii_punctuation())
            {
                flush_nouns(&mut noun_run, &mut analysis.nouns);
            } else if self.is_adjective(token) {
                flush_nouns(&mut noun_run, &mut analysis.nouns);
                analysis.adjectives.push(token.to_string());
            } else {
                noun_run.push(token);
            }
        }
        flush_nouns(&mut noun_run, &mut analysis.nouns);

        trace!(segment, ?analysis, "Tagged phrase");
        analysis
    }
}

/// Emit a run of adjacent nouns: the joined compound first, then each part.
fn flush_nouns(run: &mut Vec<&str>, nouns: &mut Vec<String>) {
    if run.len() > 1 {
        nouns.push(run.join(" "));
    }
    nouns.extend(run.drain(..).map(ToString::to_string));
}

#[async_trait]
impl TextAnalyzer for LexiconAnalyzer {
    fn is_ready(&self) -> bool {
        true
    }

    async fn extract_phrase(&self, segment: &str) -> Result<PhraseAnalysis, AnalysisError> {
        Ok(self.tag(segment))
    }
}
