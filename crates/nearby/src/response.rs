//! Results handed back to the caller of [`QueryOrchestrator::process_query`].
//!
//! [`QueryOrchestrator::process_query`]: crate::QueryOrchestrator::process_query
use std::time::Duration;

use itertools::Itertools;
use nearby_data::Poi;
use serde::{Deserialize, Serialize};

use crate::{
    intent::{display_name, plural},
    proximity::ProximityGroup,
};

const TYPE_LIST_EXAMPLE: &str = "What types are supported?";

/// Outcome of processing one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryResult {
    /// POIs matching a simple query
    Success { pois: Vec<Poi> },
    /// Targets paired with the nearby POIs within the threshold
    Grouped {
        groups: Vec<ProximityGroup>,
        target_type: String,
        nearby_type: String,
        threshold_miles: f64,
    },
    /// Guidance when nothing matched or the query was not understood
    Suggestions {
        message: String,
        examples: Vec<String>,
    },
    /// The supported categories
    TypesList { types: Vec<String> },
    Error { message: String },
}

impl QueryResult {
    /// Short name of the variant, matching its serialized `kind`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::Grouped { .. } => "grouped",
            Self::Suggestions { .. } => "suggestions",
            Self::TypesList { .. } => "types_list",
            Self::Error { .. } => "error",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Suggestions { message, .. } | Self::Error { message } => Some(message),
            _ => None,
        }
    }

    /// Guidance for an empty query.
    pub fn generic_guidance() -> Self {
        Self::Suggestions {
            message: "Ask for a kind of place, or for places near other places.".to_string(),
            examples: vec![
                "Show me parks".to_string(),
                "Cafes near museums".to_string(),
                "Restaurants with nearby parking".to_string(),
                TYPE_LIST_EXAMPLE.to_string(),
            ],
        }
    }

    /// Guidance when no category could be recognised, with examples built
    /// from the first `count` supported types.
    pub fn unrecognized(supported_types: &[String], count: usize) -> Self {
        let types = supported_types.iter().take(count).collect::<Vec<_>>();
        let mut examples = types
            .iter()
            .map(|t| format!("Show me {}", plural(t)))
            .collect::<Vec<_>>();
        if let [first, second, ..] = types.as_slice() {
            examples.push(format!(
                "{} with nearby {}",
                capitalize(&plural(first)),
                plural(second)
            ));
        }
        examples.push(TYPE_LIST_EXAMPLE.to_string());

        let message = if types.is_empty() {
            "I couldn't tell what kind of place you're looking for.".to_string()
        } else {
            format!(
                "I couldn't tell what kind of place you're looking for. Try searching for {}.",
                types.iter().map(|t| plural(t)).join(", ")
            )
        };
        Self::Suggestions { message, examples }
    }

    /// No target had a nearby POI within the threshold.
    pub fn no_proximity_matches(
        target_type: &str,
        nearby_type: &str,
        target_attributes: &[String],
        nearby_attributes: &[String],
        threshold_miles: f64,
    ) -> Self {
        let message = format!(
            "No {} found with {} within {threshold_miles} miles.",
            describe(target_attributes, &plural(target_type)),
            describe(nearby_attributes, &plural(nearby_type)),
        );
        let mut examples = vec![format!(
            "{} near {}",
            capitalize(&plural(target_type)),
            plural(nearby_type)
        )];
        if !target_attributes.is_empty() || !nearby_attributes.is_empty() {
            examples.push(format!("Show me {}", plural(target_type)));
        }
        examples.push(TYPE_LIST_EXAMPLE.to_string());
        Self::Suggestions { message, examples }
    }

    /// A simple query matched no POI.
    pub fn no_simple_matches(types: &[String], attributes: &[String]) -> Self {
        let names = types.iter().map(|t| plural(t)).join(" or ");
        let message = format!("No {} found.", describe(attributes, &names));
        let mut examples = types
            .iter()
            .map(|t| format!("Show me {}", plural(t)))
            .collect::<Vec<_>>();
        examples.push(TYPE_LIST_EXAMPLE.to_string());
        Self::Suggestions { message, examples }
    }

    pub fn still_initializing() -> Self {
        Self::Error {
            message: "The text analyzer is still initializing. Please try again in a moment."
                .to_string(),
        }
    }

    pub fn timed_out(budget: Duration) -> Self {
        Self::Error {
            message: format!(
                "Understanding your query took longer than {}ms. Please try again.",
                budget.as_millis()
            ),
        }
    }

    pub fn malformed_data(detail: &str) -> Self {
        Self::Error {
            message: format!("The POI data is malformed and could not be loaded: {detail}"),
        }
    }

    pub fn data_unavailable(detail: &str) -> Self {
        Self::Error {
            message: format!("The POI data could not be loaded ({detail}). Please try again."),
        }
    }

    pub fn internal_error() -> Self {
        Self::Error {
            message: "Something went wrong while processing your query.".to_string(),
        }
    }
}

fn describe(attributes: &[String], noun: &str) -> String {
    if attributes.is_empty() {
        noun.to_string()
    } else {
        format!("{} {noun}", attributes.join(", "))
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Readable one-line summary of a result.
impl std::fmt::Display for QueryResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success { pois } => write!(f, "{} place(s)", pois.len()),
            Self::Grouped {
                groups,
                target_type,
                nearby_type,
                threshold_miles,
            } => write!(
                f,
                "{} {} with {} within {threshold_miles} miles",
                groups.len(),
                display_name(target_type),
                display_name(nearby_type)
            ),
            Self::Suggestions { message, .. } | Self::Error { message } => f.write_str(message),
            Self::TypesList { types } => write!(f, "Supported types: {}", types.join(", ")),
        }
    }
}
