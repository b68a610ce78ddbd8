//! Advisory ranking of labourers for a complaint site.
//!
//! A weighted sum over three independent factors, each clamped to its
//! weight before summing. Pure functions: no storage, no clock. The caller
//! supplies the set of labour ids that already have a collected point on
//! the reference date, so availability stays a function of the inputs.

use std::collections::HashSet;

use crate::domain::models::labour::Labour;

/// Maximum points awarded for proximity to the complaint site.
pub const DISTANCE_WEIGHT: f64 = 50.0;
/// Maximum points awarded for a working-area match against the address.
pub const AREA_MATCH_WEIGHT: f64 = 30.0;
/// Maximum points awarded when the labour has collected nothing today.
pub const AVAILABILITY_WEIGHT: f64 = 20.0;

/// Distance at or beyond which the proximity factor scores zero, in
/// coordinate degrees. Candidates farther away are ranked low, not rejected.
pub const MAX_DISTANCE_DEGREES: f64 = 0.1;

/// The complaint location a ranking is computed against. An all-default
/// site (origin coordinates, empty address) floors the distance and
/// area factors rather than failing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComplaintSite {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
}

/// A candidate with its computed score, ready for presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredLabour {
    pub labour: Labour,
    pub score: f64,
}

/// Euclidean distance in degrees, against last known coordinates.
/// Missing coordinates default to the origin, which simply ranks the
/// candidate far from any real-world site.
pub fn distance_score(labour: &Labour, site: &ComplaintSite) -> f64 {
    let lat = labour.last_latitude.unwrap_or(0.0);
    let lng = labour.last_longitude.unwrap_or(0.0);
    let distance = ((site.latitude - lat).powi(2) + (site.longitude - lng).powi(2)).sqrt();
    let proximity = (1.0 - distance / MAX_DISTANCE_DEGREES).max(0.0);
    proximity * DISTANCE_WEIGHT
}

/// Binary factor: full weight when any working area appears in the address.
pub fn area_match_score(labour: &Labour, site: &ComplaintSite) -> f64 {
    if !site.address.is_empty() && labour.covers_address(&site.address) {
        AREA_MATCH_WEIGHT
    } else {
        0.0
    }
}

/// Binary factor: full weight unless the labour already collected today.
pub fn availability_score(labour: &Labour, collected_today: &HashSet<String>) -> f64 {
    if collected_today.contains(&labour.id) {
        0.0
    } else {
        AVAILABILITY_WEIGHT
    }
}

/// Total suitability in [0, 100].
pub fn score(labour: &Labour, site: &ComplaintSite, collected_today: &HashSet<String>) -> f64 {
    distance_score(labour, site)
        + area_match_score(labour, site)
        + availability_score(labour, collected_today)
}

/// Rank candidates by score, highest first. The sort is stable, so input
/// order breaks ties.
pub fn rank(
    candidates: Vec<Labour>,
    site: &ComplaintSite,
    collected_today: &HashSet<String>,
) -> Vec<ScoredLabour> {
    let mut scored: Vec<ScoredLabour> = candidates
        .into_iter()
        .map(|labour| {
            let score = score(&labour, site, collected_today);
            ScoredLabour { labour, score }
        })
        .collect();
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored
}
