//! Equality join of survey rows against the municipality gazetteer.
//!
//! The gazetteer is deduplicated by canonical name before the join; the
//! survey city column is already upper-case and accent-free, so lookups
//! are plain equality against the canonical gazetteer names. No
//! edit-distance matching is performed.

use std::collections::BTreeMap;

use fuel_map_survey_models::{JoinedRecord, PlaceRecord, PriceRecord};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::normalize::canonical_name;

/// How unmatched survey rows are handled by [`join`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum JoinMode {
    /// Keep unmatched survey rows with `None` coordinates.
    Left,
    /// Drop unmatched survey rows; every output row has coordinates,
    /// which the map layer requires for cross-region aggregation.
    Inner,
}

/// Joins survey rows against the gazetteer, attaching coordinates.
///
/// Gazetteer entries whose canonical name duplicates an already-kept one
/// are dropped (first occurrence wins, in source-file order). An
/// unmatched survey city name is never an error: the row is kept with
/// `None` coordinates under [`JoinMode::Left`] or dropped under
/// [`JoinMode::Inner`]. Empty inputs produce an empty result.
#[must_use]
pub fn join(
    price_rows: &[PriceRecord],
    place_rows: &[PlaceRecord],
    mode: JoinMode,
) -> Vec<JoinedRecord> {
    let mut gazetteer: BTreeMap<String, &PlaceRecord> = BTreeMap::new();
    let mut duplicates = 0usize;

    for place in place_rows {
        let key = canonical_name(&place.name);
        if gazetteer.contains_key(&key) {
            duplicates += 1;
        } else {
            gazetteer.insert(key, place);
        }
    }

    if duplicates > 0 {
        log::debug!("Gazetteer: dropped {duplicates} duplicate canonical names (first-seen kept)");
    }

    let mut joined = Vec::with_capacity(price_rows.len());
    let mut unmatched = 0usize;

    for row in price_rows {
        match gazetteer.get(row.city.as_str()) {
            Some(place) => {
                joined.push(JoinedRecord::new(
                    row.clone(),
                    place.latitude,
                    place.longitude,
                ));
            }
            None => {
                unmatched += 1;
                if mode == JoinMode::Left {
                    joined.push(JoinedRecord::new(row.clone(), None, None));
                }
            }
        }
    }

    log::info!(
        "Joined {} survey rows against {} gazetteer entries ({unmatched} unmatched, {mode} join)",
        price_rows.len(),
        gazetteer.len(),
    );

    joined
}
