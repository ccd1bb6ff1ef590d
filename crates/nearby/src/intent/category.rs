//! Runtime registry of POI categories and the loose token matching rule.
use std::borrow::Cow;

/// Lower-case `category` and replace underscores with spaces.
pub fn display_name(category: &str) -> String {
    category.to_lowercase().replace('_', " ")
}

/// Naive singular form: `ies` becomes `y`, otherwise one trailing `s` is
/// dropped (but not from `ss`).
pub fn singular(word: &str) -> Cow<'_, str> {
    if let Some(stem) = word.strip_suffix("ies").filter(|stem| stem.len() > 1) {
        Cow::Owned(format!("{stem}y"))
    } else if word.ends_with('s') && !word.ends_with("ss") && word.len() > 1 {
        Cow::Borrowed(&word[..word.len() - 1])
    } else {
        Cow::Borrowed(word)
    }
}

/// Naive plural of a category's display name, used in suggestion text.
pub fn plural(category: &str) -> String {
    let name = display_name(category);
    if name.ends_with('s') {
        name
    } else if let Some(stem) = name
        .strip_suffix('y')
        .filter(|stem| !stem.ends_with(['a', 'e', 'i', 'o', 'u']))
    {
        format!("{stem}ies")
    } else {
        format!("{name}s")
    }
}

/// Whether a query token names `category`.
///
/// Both sides are lower-cased and underscores in the category become spaces.
/// The token matches on equality (raw or normalised), on equal singular forms,
/// or when either string contains the other. The containment rule is loose on
/// purpose: `park` matches `parking`.
pub fn token_matches_category(token: &str, category: &str) -> bool {
    let token = token.trim().to_lowercase();
    if token.is_empty() {
        return false;
    }
    let raw = category.trim().to_lowercase();
    let normalized = raw.replace('_', " ");

    token == raw
        || token == normalized
        || singular(&token) == singular(&normalized)
        || token.contains(normalized.as_str())
        || normalized.contains(token.as_str())
}

fn exact_match(token: &str, category: &str) -> bool {
    let token = token.trim().to_lowercase();
    let raw = category.trim().to_lowercase();
    let normalized = raw.replace('_', " ");
    token == raw || token == normalized || singular(&token) == singular(&normalized)
}

/// The supported POI categories of a loaded dataset.
///
/// Categories are data, not code: the registry is built from whatever
/// `supportedTypes` the dataset declares and keeps their order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryRegistry {
    types: Vec<String>,
}

impl CategoryRegistry {
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
        }
    }

    pub fn types(&self) -> &[String] {
        &self.types
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// First category named by `token`.
    ///
    /// Exact and singular matches win over containment matches, so `parking`
    /// resolves to a `parking` category even when `park` is listed first.
    /// Multi-word tokens (compound nouns) only match exactly; their parts are
    /// matched on their own.
    pub fn match_token(&self, token: &str) -> Option<&str> {
        let exact = self
            .types
            .iter()
            .find(|category| exact_match(token, category));
        if exact.is_some() || token.trim().contains(char::is_whitespace) {
            return exact.map(String::as_str);
        }
        self.types
            .iter()
            .find(|category| token_matches_category(token, category))
            .map(String::as_str)
    }

    /// Whether `word` would match any category.
    pub fn is_category_term(&self, word: &str) -> bool {
        self.match_token(word).is_some()
    }
}
