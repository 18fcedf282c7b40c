//! Three-level place hierarchy derived from the joined survey table.
//!
//! Distinct city/state/region values are taken from the rows as observed;
//! no external reference table is consulted. The index is built once at
//! startup and is immutable for the session.

use std::collections::{BTreeMap, BTreeSet};

use fuel_map_survey_models::{JoinedRecord, PlaceType, region_display_name};
use serde::{Deserialize, Serialize};

use crate::normalize::{canonical_name, strip_uf};

/// One node of the place hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceHierarchyEntry {
    /// Stable synthetic id (`city_...`, `state_...`, `region_...`).
    pub place_id: String,
    /// Hierarchy level of this node.
    pub place_type: PlaceType,
    /// Name shown in the place-selector widget and used for row matching.
    pub display_name: String,
    /// Id of the containing state (for cities) or region (for states);
    /// `None` for regions.
    pub parent_id: Option<String>,
}

/// Builds the synthetic id for a city display name.
///
/// A trailing `"(UF)"` token is dropped before canonicalization so the id
/// stays collision-resistant across the composite display form.
#[must_use]
pub fn city_id(display_name: &str) -> String {
    format!("city_{}", canonical_name(strip_uf(display_name)))
}

/// Builds the synthetic id for a state name.
#[must_use]
pub fn state_id(state: &str) -> String {
    format!("state_{}", canonical_name(state))
}

/// Builds the synthetic id for a region name (without display prefix).
#[must_use]
pub fn region_id(region: &str) -> String {
    format!("region_{}", canonical_name(region))
}

/// Bidirectional id <-> display-name index over the three place levels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceHierarchyIndex {
    entries: Vec<PlaceHierarchyEntry>,
    id_map: BTreeMap<String, String>,
}

impl PlaceHierarchyIndex {
    /// Derives the hierarchy from the joined base table.
    ///
    /// Every city's parent chain reaches exactly one region through its
    /// state; regions are roots. When a city or state appears under more
    /// than one parent in the rows, the first observed parent wins.
    #[must_use]
    pub fn build(rows: &[JoinedRecord]) -> Self {
        let mut regions: BTreeSet<&str> = BTreeSet::new();
        let mut states: BTreeMap<&str, &str> = BTreeMap::new();
        let mut cities: BTreeMap<&str, &str> = BTreeMap::new();

        for row in rows {
            regions.insert(row.region.as_str());
            states.entry(row.state.as_str()).or_insert(row.region.as_str());
            cities.entry(row.city.as_str()).or_insert(row.state.as_str());
        }

        let mut entries = Vec::with_capacity(regions.len() + states.len() + cities.len());

        for region in &regions {
            entries.push(PlaceHierarchyEntry {
                place_id: region_id(region),
                place_type: PlaceType::Region,
                display_name: region_display_name(region),
                parent_id: None,
            });
        }

        for (state, region) in &states {
            entries.push(PlaceHierarchyEntry {
                place_id: state_id(state),
                place_type: PlaceType::State,
                display_name: (*state).to_string(),
                parent_id: Some(region_id(region)),
            });
        }

        for (city, state) in &cities {
            entries.push(PlaceHierarchyEntry {
                place_id: city_id(city),
                place_type: PlaceType::City,
                display_name: (*city).to_string(),
                parent_id: Some(state_id(state)),
            });
        }

        let id_map = entries
            .iter()
            .map(|e| (e.place_id.clone(), e.display_name.clone()))
            .collect();

        log::info!(
            "Place hierarchy: {} regions, {} states, {} cities",
            regions.len(),
            states.len(),
            cities.len(),
        );

        Self { entries, id_map }
    }

    /// All hierarchy nodes, regions first, then states, then cities.
    #[must_use]
    pub fn entries(&self) -> &[PlaceHierarchyEntry] {
        &self.entries
    }

    /// Total mapping from place id to display name, in stable order for
    /// the selector widget.
    #[must_use]
    pub const fn id_map(&self) -> &BTreeMap<String, String> {
        &self.id_map
    }

    /// Resolves a place id back to its display name.
    #[must_use]
    pub fn display_name(&self, place_id: &str) -> Option<&str> {
        self.id_map.get(place_id).map(String::as_str)
    }

    /// Looks up a hierarchy node by id.
    #[must_use]
    pub fn entry(&self, place_id: &str) -> Option<&PlaceHierarchyEntry> {
        self.entries.iter().find(|e| e.place_id == place_id)
    }
}
