//! Gas-station totals across a mixed-level place selection.
//!
//! Summing raw counts over a selection that contains both a place and
//! one of its ancestors double-counts the child. The counter keeps every
//! selected region in full and drops states/cities already subsumed by a
//! selected ancestor. Parent resolution consults the joined base table —
//! the aggregated table has lost the parent linkage.

use std::collections::BTreeSet;

use fuel_map_survey_models::{AggregatedRow, JoinedRecord, PlaceType, strip_region_prefix};

/// Resolves a state's region from the last matching base row.
fn region_of_state<'a>(base: &'a [JoinedRecord], state: &str) -> Option<&'a str> {
    base.iter()
        .rev()
        .find(|row| row.state == state)
        .map(|row| row.region.as_str())
}

/// Resolves a city's (state, region) from the last matching base row.
fn parents_of_city<'a>(base: &'a [JoinedRecord], city: &str) -> Option<(&'a str, &'a str)> {
    base.iter()
        .rev()
        .find(|row| row.city == city)
        .map(|row| (row.state.as_str(), row.region.as_str()))
}

/// Totals the gas-station count of a filtered aggregated table without
/// double counting overlapping hierarchy levels.
///
/// Policy:
/// - every selected region's count is included in full;
/// - a selected state is included unless its region is among the
///   selected regions;
/// - a selected city is included unless its state is among the selected
///   states or its region is among the selected regions.
///
/// A state or city with no row in the base table resolves to no known
/// parents and is always counted. Rows with a missing count contribute
/// zero.
#[must_use]
pub fn station_count(filtered: &[AggregatedRow], base: &[JoinedRecord]) -> u64 {
    let selected_regions: BTreeSet<&str> = filtered
        .iter()
        .filter(|row| row.place_type == PlaceType::Region)
        .map(|row| strip_region_prefix(&row.place_name))
        .collect();

    let selected_states: BTreeSet<&str> = filtered
        .iter()
        .filter(|row| row.place_type == PlaceType::State)
        .map(|row| row.place_name.as_str())
        .collect();

    let mut total = 0u64;

    for row in filtered {
        let count = row.gas_station_count.unwrap_or(0);

        match row.place_type {
            PlaceType::Region => total += count,
            PlaceType::State => {
                let covered = region_of_state(base, &row.place_name)
                    .is_some_and(|region| selected_regions.contains(region));
                if !covered {
                    total += count;
                }
            }
            PlaceType::City => {
                let covered = parents_of_city(base, &row.place_name).is_some_and(
                    |(state, region)| {
                        selected_states.contains(state) || selected_regions.contains(region)
                    },
                );
                if !covered {
                    total += count;
                }
            }
        }
    }

    total
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use fuel_map_survey_models::{PriceMetrics, PriceRecord};

    use super::*;

    fn joined(city: &str, state: &str, region: &str, count: u32) -> JoinedRecord {
        JoinedRecord::new(
            PriceRecord {
                month: NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
                product: "GASOLINA COMUM".to_string(),
                city: city.to_string(),
                region: region.to_string(),
                state: state.to_string(),
                gas_station_count: Some(count),
                unit: "R$/l".to_string(),
                metrics: PriceMetrics::default(),
            },
            None,
            None,
        )
    }

    fn row(place_type: PlaceType, place_name: &str, count: u64) -> AggregatedRow {
        AggregatedRow {
            place_type,
            place_name: place_name.to_string(),
            month: NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
            product: "GASOLINA COMUM".to_string(),
            unit: "R$/l".to_string(),
            gas_station_count: Some(count),
            latitude: None,
            longitude: None,
            metrics: PriceMetrics::default(),
        }
    }

    fn base() -> Vec<JoinedRecord> {
        vec![
            joined("SAO PAULO", "SAO PAULO", "SUDESTE", 10),
            joined("CURITIBA", "PARANA", "SUL", 7),
            joined("FLORIANOPOLIS", "SANTA CATARINA", "SUL", 5),
        ]
    }

    #[test]
    fn region_with_member_state_counts_region_alone() {
        let filtered = vec![
            row(PlaceType::Region, "REGIAO SUL", 12),
            row(PlaceType::State, "PARANA", 7),
        ];

        assert_eq!(station_count(&filtered, &base()), 12);
    }

    #[test]
    fn region_with_member_city_counts_region_alone() {
        let filtered = vec![
            row(PlaceType::Region, "REGIAO SUL", 12),
            row(PlaceType::City, "CURITIBA", 7),
        ];

        assert_eq!(station_count(&filtered, &base()), 12);
    }

    #[test]
    fn state_with_member_city_counts_state_alone() {
        let filtered = vec![
            row(PlaceType::State, "PARANA", 7),
            row(PlaceType::City, "CURITIBA", 7),
        ];

        assert_eq!(station_count(&filtered, &base()), 7);
    }

    #[test]
    fn unrelated_places_are_additive() {
        let filtered = vec![
            row(PlaceType::City, "SAO PAULO", 5),
            row(PlaceType::City, "CURITIBA", 7),
        ];

        assert_eq!(station_count(&filtered, &base()), 12);
    }

    #[test]
    fn unrelated_state_survives_region_selection() {
        let filtered = vec![
            row(PlaceType::Region, "REGIAO SUL", 12),
            row(PlaceType::State, "SAO PAULO", 10),
        ];

        assert_eq!(station_count(&filtered, &base()), 22);
    }

    #[test]
    fn state_without_base_row_is_always_counted() {
        let filtered = vec![
            row(PlaceType::Region, "REGIAO SUL", 12),
            row(PlaceType::State, "ACRE", 3),
        ];

        assert_eq!(station_count(&filtered, &base()), 15);
    }

    #[test]
    fn parent_resolution_uses_last_matching_base_row() {
        // Two base rows for the same state with diverging regions: the
        // later one is authoritative.
        let mut base = base();
        base.push(joined("LONDRINA", "PARANA", "SUDESTE", 4));

        let filtered = vec![
            row(PlaceType::Region, "REGIAO SUL", 12),
            row(PlaceType::State, "PARANA", 11),
        ];

        // PARANA now resolves to SUDESTE, which is not selected.
        assert_eq!(station_count(&filtered, &base), 23);
    }

    #[test]
    fn missing_counts_contribute_zero() {
        let mut no_count = row(PlaceType::City, "SAO PAULO", 0);
        no_count.gas_station_count = None;

        assert_eq!(station_count(&[no_count], &base()), 0);
    }

    #[test]
    fn empty_selection_totals_zero() {
        assert_eq!(station_count(&[], &base()), 0);
    }

    #[test]
    fn months_sum_within_a_selected_region() {
        let filtered = vec![
            row(PlaceType::Region, "REGIAO SUL", 12),
            row(PlaceType::Region, "REGIAO SUL", 13),
        ];

        assert_eq!(station_count(&filtered, &base()), 25);
    }
}
