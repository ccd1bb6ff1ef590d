//! Pairing POIs of one category with nearby POIs of another.
//!
//! The matcher compares every target with every candidate. Datasets are local
//! and small so no spatial index is used; large target lists are spread over
//! the rayon pool instead.
use itertools::Itertools;
use nearby_data::Poi;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::geo::{distance_miles, format_distance, round_to};

/// Target count from which distances are computed in parallel.
pub const PARALLEL_TARGET_THRESHOLD: usize = 64;

/// A candidate within range of a target, with its distance rounded to two
/// decimal places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyPoi {
    pub poi: Poi,
    pub distance_miles: f64,
}

impl NearbyPoi {
    pub fn formatted_distance(&self) -> String {
        format_distance(self.distance_miles)
    }
}

/// A target POI and the candidates within the threshold, closest first.
/// Never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityGroup {
    pub target: Poi,
    pub nearby: Vec<NearbyPoi>,
}

/// Group each target with the candidates no further than `threshold_miles`.
///
/// Candidates are sorted by ascending distance, ties keeping input order.
/// Targets with no candidate in range are dropped and the remaining groups
/// follow the order of `targets`. A candidate sharing its target's id is
/// skipped and repeated candidate ids are only considered once.
#[instrument(
    name = "Find Nearby",
    level = "debug",
    skip_all,
    fields(targets = targets.len(), candidates = candidates.len(), threshold_miles = threshold_miles)
)]
pub fn find_nearby(
    targets: &[Poi],
    candidates: &[Poi],
    threshold_miles: f64,
) -> Vec<ProximityGroup> {
    let candidates = candidates
        .iter()
        .unique_by(|poi| poi.id.as_str())
        .collect::<Vec<_>>();

    let group_for = |target: &Poi| group_target(target, &candidates, threshold_miles);

    let groups: Vec<ProximityGroup> = if targets.len() >= PARALLEL_TARGET_THRESHOLD {
        targets.par_iter().filter_map(group_for).collect()
    } else {
        targets.iter().filter_map(group_for).collect()
    };

    debug!(groups = groups.len(), "Proximity matching complete");
    groups
}

/// `distance` at two decimal places, never above `threshold_miles`. When
/// rounding up would cross the threshold, the threshold is floored to two
/// places instead.
fn rounded_within(distance: f64, threshold_miles: f64) -> f64 {
    let rounded = round_to(distance, 2);
    if rounded <= threshold_miles {
        rounded
    } else {
        (threshold_miles * 100.0).floor() / 100.0
    }
}

fn group_target(
    target: &Poi,
    candidates: &[&Poi],
    threshold_miles: f64,
) -> Option<ProximityGroup> {
    let mut in_range = candidates
        .iter()
        .filter(|candidate| candidate.id != target.id)
        .filter_map(|candidate| {
            let distance = distance_miles(target.location, candidate.location);
            (distance <= threshold_miles).then_some((*candidate, distance))
        })
        .collect::<Vec<_>>();

    if in_range.is_empty() {
        return None;
    }
    in_range.sort_by(|a, b| a.1.total_cmp(&b.1));

    Some(ProximityGroup {
        target: target.clone(),
        nearby: in_range
            .into_iter()
            .map(|(poi, distance)| NearbyPoi {
                poi: poi.clone(),
                distance_miles: rounded_within(distance, threshold_miles),
            })
            .collect(),
    })
}

/// Whether any of the POI's tags contains, or is contained by, any of the
/// requested tokens. Case-insensitive.
pub fn attribute_matches(poi: &Poi, requested: &[String]) -> bool {
    poi.attributes.iter().any(|tag| {
        let tag = tag.to_lowercase();
        requested
            .iter()
            .map(|token| token.trim().to_lowercase())
            .filter(|token| !token.is_empty())
            .any(|token| tag.contains(&token) || token.contains(&tag))
    })
}

pub fn any_has_attributes(pois: &[Poi]) -> bool {
    pois.iter().any(Poi::has_attributes)
}

/// Keep the POIs matching at least one requested attribute. An empty request
/// keeps everything.
pub fn filter_by_attributes(pois: Vec<Poi>, requested: &[String]) -> Vec<Poi> {
    if requested.is_empty() {
        return pois;
    }
    pois.into_iter()
        .filter(|poi| attribute_matches(poi, requested))
        .collect()
}

/// Attribute filtering as applied to query results: skipped entirely when no
/// POI in the set carries attributes, otherwise [`filter_by_attributes`].
pub fn apply_attribute_filter(pois: Vec<Poi>, requested: &[String]) -> Vec<Poi> {
    if requested.is_empty() || !any_has_attributes(&pois) {
        return pois;
    }
    filter_by_attributes(pois, requested)
}
