//! Row selection for a mixed-level place selection.
//!
//! Selections come from the place-selector widget as synthetic ids
//! (`city_...`, `state_...`, `region_...`) and may span hierarchy levels,
//! e.g. one region plus one unrelated city. Ids resolve to display names
//! through the hierarchy index, never by parsing the id itself.

use std::collections::BTreeSet;

use fuel_map_places::hierarchy::PlaceHierarchyIndex;
use fuel_map_survey_models::{AggregatedRow, PlaceType};

use crate::AnalyticsError;

/// Selects aggregated rows whose (place type, place name) matches the
/// given place ids.
///
/// Duplicate ids collapse; a single id behaves exactly like a
/// one-element set. Matching zero rows is a valid outcome, not an error
/// — an empty selection renders as empty charts.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidPlaceIdentifier`] for an id without
/// a recognized level prefix, and [`AnalyticsError::UnknownPlace`] for a
/// well-prefixed id absent from the index.
pub fn filter_by_places(
    rows: &[AggregatedRow],
    place_ids: &[String],
    places: &PlaceHierarchyIndex,
) -> Result<Vec<AggregatedRow>, AnalyticsError> {
    let ids: BTreeSet<&str> = place_ids.iter().map(String::as_str).collect();

    let mut cities: BTreeSet<&str> = BTreeSet::new();
    let mut states: BTreeSet<&str> = BTreeSet::new();
    let mut regions: BTreeSet<&str> = BTreeSet::new();

    for id in ids {
        let level = if id.starts_with("city_") {
            PlaceType::City
        } else if id.starts_with("state_") {
            PlaceType::State
        } else if id.starts_with("region_") {
            PlaceType::Region
        } else {
            return Err(AnalyticsError::InvalidPlaceIdentifier { id: id.to_string() });
        };

        let Some(name) = places.display_name(id) else {
            return Err(AnalyticsError::UnknownPlace { id: id.to_string() });
        };

        match level {
            PlaceType::City => cities.insert(name),
            PlaceType::State => states.insert(name),
            PlaceType::Region => regions.insert(name),
        };
    }

    Ok(rows
        .iter()
        .filter(|row| match row.place_type {
            PlaceType::City => cities.contains(row.place_name.as_str()),
            PlaceType::State => states.contains(row.place_name.as_str()),
            PlaceType::Region => regions.contains(row.place_name.as_str()),
        })
        .cloned()
        .collect())
}
