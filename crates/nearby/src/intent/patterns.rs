//! Structural query patterns.
use once_cell::sync::Lazy;
use regex::{Regex, RegexSet};

/// Request phrasings only; "what types of restaurants ..." is a category
/// query and must reach proximity and simple extraction.
static TYPE_LIST_PATTERNS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"(?i)\bwhat\s+(?:types|categories)\s+(?:are|do|does|can|is)\b",
        r"(?i)\b(?:list|show)\s+(?:me\s+)?(?:all\s+)?(?:the\s+)?(?:poi\s+)?(?:types|categories)(?:\s+(?:available|supported|you\s+have|there\s+are))?[\s?.!]*$",
        r"(?i)\bwhich\s+(?:types|categories)\s+(?:are|do|does|can|is)\b",
        r"(?i)\bwhat\s+can\s+i\s+(?:search|look\s+for|find)\b",
        r"(?i)\bwhat\s+pois?\s+(?:types|are|do|can|is)\b",
        r"(?i)\b(?:supported|available)\s+(?:types|categories)\b",
    ])
    .expect("valid type-list patterns")
});

/// Spatial relation phrases, in priority order. Each captures the text on
/// either side of the relation.
static PROXIMITY_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        (
            "with nearby",
            r"(?is)^\s*(?P<left>.+?)\s+(?:with|having|that\s+have)\s+(?:nearby|near\s+by)\s+(?P<right>.+?)[\s?.!]*$",
        ),
        ("near", r"(?is)^\s*(?P<left>.+?)\s+near\s+(?P<right>.+?)[\s?.!]*$"),
        ("close to", r"(?is)^\s*(?P<left>.+?)\s+close\s+to\s+(?P<right>.+?)[\s?.!]*$"),
        ("around", r"(?is)^\s*(?P<left>.+?)\s+around\s+(?P<right>.+?)[\s?.!]*$"),
    ]
    .into_iter()
    .map(|(relation, pattern)| (relation, Regex::new(pattern).expect("valid proximity pattern")))
    .collect()
});

/// Whether the query asks which POI types are available.
pub fn is_type_list_request(query: &str) -> bool {
    TYPE_LIST_PATTERNS.is_match(query)
}

/// A query split around a spatial relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProximitySplit<'a> {
    pub relation: &'static str,
    pub left: &'a str,
    pub right: &'a str,
}

/// Split `query` on the first relation pattern that matches structurally.
pub fn split_proximity(query: &str) -> Option<ProximitySplit<'_>> {
    PROXIMITY_PATTERNS.iter().find_map(|(relation, pattern)| {
        let captures = pattern.captures(query)?;
        Some(ProximitySplit {
            relation: *relation,
            left: captures.name("left")?.as_str().trim(),
            right: captures.name("right")?.as_str().trim(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_list_requests() {
        for query in [
            "what types are supported?",
            "What Types are supported",
            "list types",
            "show me all the categories",
            "which types do you have",
            "what can I search for?",
            "what POI are there",
            "supported types please",
            "what categories are available?",
            "show types",
            "list the categories you have",
        ] {
            assert!(is_type_list_request(query), "{query}");
        }
        for query in [
            "parks",
            "restaurants near parks",
            "show cafes",
            "types of cheese",
            "what kinds of restaurants are near parks",
            "what types of cafes are quiet",
            "which categories of museums are free",
            "show categories of cafes near parks",
            "list types of parks",
        ] {
            assert!(!is_type_list_request(query), "{query}");
        }
    }

    #[test]
    fn test_split_with_nearby() {
        let split = split_proximity("parks with nearby restaurants").unwrap();
        assert_eq!(split.relation, "with nearby");
        assert_eq!(split.left, "parks");
        assert_eq!(split.right, "restaurants");

        let split = split_proximity("Quiet cafes that have nearby dog-friendly parks?").unwrap();
        assert_eq!(split.left, "Quiet cafes");
        assert_eq!(split.right, "dog-friendly parks");

        let split = split_proximity("hotels having nearby parking").unwrap();
        assert_eq!(split.left, "hotels");
        assert_eq!(split.right, "parking");
    }

    #[test]
    fn test_split_other_relations() {
        let split = split_proximity("cafes near museums").unwrap();
        assert_eq!((split.relation, split.left, split.right), ("near", "cafes", "museums"));

        let split = split_proximity("bars close to hotels!").unwrap();
        assert_eq!((split.relation, split.left, split.right), ("close to", "bars", "hotels"));

        let split = split_proximity("pharmacies around the library").unwrap();
        assert_eq!(split.relation, "around");
        assert_eq!(split.right, "the library");
    }

    #[test]
    fn test_with_nearby_takes_priority_over_near() {
        let split = split_proximity("parks with nearby cafes near the bay").unwrap();
        assert_eq!(split.relation, "with nearby");
        assert_eq!(split.left, "parks");
        assert_eq!(split.right, "cafes near the bay");
    }

    #[test]
    fn test_no_relation() {
        assert_eq!(split_proximity("cheap restaurants"), None);
        assert_eq!(split_proximity("nearby parks"), None);
        assert_eq!(split_proximity("near"), None);
    }
}
