//! Attribute-similarity duplicate decision.
//!
//! Two station records are compared attribute by attribute, each comparison
//! yielding a three-valued signal, and the signals are combined with fixed
//! precedence rules rather than a weighted sum. Missing attributes never
//! confirm a match, and ambiguity resolves to not-duplicate: wrongly
//! keeping two records beats wrongly merging two distinct stations.

use strsim::{jaro_winkler, normalized_levenshtein};
use voltgrid_core::config::MergeConfig;
use voltgrid_core::models::NearbyStation;

/// Outcome of comparing one attribute across a candidate pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    /// Both sides present and similar.
    Match,
    /// Both sides present and clearly different.
    Conflict,
    /// Absent on either side, or in the grey zone between the cutoffs.
    Unknown,
}

fn normalize(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Normalized `street,town` key, only when both parts are recorded.
fn address_key(station: &NearbyStation) -> Option<String> {
    let address = station.address.as_ref()?;
    let street = address.street.as_deref().filter(|s| !s.trim().is_empty())?;
    let town = address.town.as_deref().filter(|t| !t.trim().is_empty())?;
    Some(format!("{},{}", normalize(street), normalize(town)))
}

fn address_signal(config: &MergeConfig, a: &NearbyStation, b: &NearbyStation) -> Signal {
    let (Some(left), Some(right)) = (address_key(a), address_key(b)) else {
        return Signal::Unknown;
    };
    if left == right {
        return Signal::Match;
    }
    let similarity = normalized_levenshtein(&left, &right);
    if similarity >= config.address_similarity_threshold.value {
        Signal::Match
    } else if similarity < config.address_conflict_threshold.value {
        Signal::Conflict
    } else {
        Signal::Unknown
    }
}

fn operator_signal(config: &MergeConfig, a: &NearbyStation, b: &NearbyStation) -> Signal {
    let (Some(left), Some(right)) = (
        a.operator.as_deref().filter(|o| !o.trim().is_empty()),
        b.operator.as_deref().filter(|o| !o.trim().is_empty()),
    ) else {
        return Signal::Unknown;
    };
    let left = normalize(left);
    let right = normalize(right);
    if left == right {
        return Signal::Match;
    }
    let similarity = jaro_winkler(&left, &right);
    if similarity >= config.operator_similarity_threshold.value {
        Signal::Match
    } else if similarity < config.operator_conflict_threshold.value {
        Signal::Conflict
    } else {
        Signal::Unknown
    }
}

fn capacity_signal(config: &MergeConfig, a: &NearbyStation, b: &NearbyStation) -> Signal {
    let (Some(left), Some(right)) = (a.capacity(), b.capacity()) else {
        return Signal::Unknown;
    };
    if (left - right).abs() <= config.capacity_tolerance.value {
        Signal::Match
    } else {
        Signal::Conflict
    }
}

/// Decide whether `candidate` is a duplicate of `current`.
///
/// `distance_m` is the precomputed geodesic distance between the two
/// records; the decision is a pure function of it and the two attribute
/// sets. Precedence:
///
/// 1. beyond the search radius: never a duplicate;
/// 2. address match: duplicate, even against a conflicting operator;
/// 3. address conflict: not a duplicate, whatever else matches;
/// 4. operator match within the tighter secondary distance, with no
///    capacity conflict: duplicate;
/// 5. otherwise, including bare proximity with no signal: not a duplicate.
pub fn is_duplicate(
    current: &NearbyStation,
    candidate: &NearbyStation,
    distance_m: f64,
    config: &MergeConfig,
) -> bool {
    if distance_m > config.search_radius_m.value {
        return false;
    }

    match address_signal(config, current, candidate) {
        Signal::Match => return true,
        Signal::Conflict => return false,
        Signal::Unknown => {}
    }

    operator_signal(config, current, candidate) == Signal::Match
        && distance_m <= config.operator_match_max_distance_m.value
        && capacity_signal(config, current, candidate) != Signal::Conflict
}
