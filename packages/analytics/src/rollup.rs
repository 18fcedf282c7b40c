//! Three-level expansion of the joined survey table.
//!
//! City rows pass through untouched; state and region rows are grouped
//! by (place, month) with a level-appropriate reducer per metric. The
//! full expansion is recomputed from scratch on every filter change —
//! the tables are a few thousand rows, so there is no caching layer.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use fuel_map_survey_models::{
    AggregatedRow, JoinedRecord, PlaceType, PriceMetrics, region_display_name,
};

/// Reducer applied to one metric column within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reducer {
    Mean,
    Min,
    Max,
}

/// Reducer for the spread metrics (standard deviation and coefficient of
/// variation).
///
/// Averaging a standard deviation across cities is statistically
/// imprecise; the historical dashboard did it anyway and downstream
/// charts expect it. Swapping the policy here changes every spread
/// column at once.
const fn spread_reducer() -> Reducer {
    Reducer::Mean
}

#[allow(clippy::cast_precision_loss)]
fn reduce(values: &[f64], reducer: Reducer) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    match reducer {
        Reducer::Mean => Some(values.iter().sum::<f64>() / values.len() as f64),
        Reducer::Min => values.iter().copied().reduce(f64::min),
        Reducer::Max => values.iter().copied().reduce(f64::max),
    }
}

/// Applies a reducer to one metric column of a group, skipping missing
/// cells the way the source data's NaN cells were skipped.
fn metric(
    group: &[&JoinedRecord],
    reducer: Reducer,
    pick: impl Fn(&PriceMetrics) -> Option<f64>,
) -> Option<f64> {
    let values: Vec<f64> = group.iter().filter_map(|row| pick(&row.metrics)).collect();
    reduce(&values, reducer)
}

/// Expands a slice of the joined table into the unioned aggregated table.
///
/// The slice is expected to already be filtered to a single product; the
/// dashboard layer guarantees this. Output order is all CITY rows (input
/// order), then STATE rows, then REGION rows (each sorted by place and
/// month). No CITY row is ever dropped or merged.
#[must_use]
pub fn aggregate(rows: &[JoinedRecord]) -> Vec<AggregatedRow> {
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        out.push(AggregatedRow {
            place_type: PlaceType::City,
            place_name: row.city.clone(),
            month: row.month,
            product: row.product.clone(),
            unit: row.unit.clone(),
            gas_station_count: row.gas_station_count.map(u64::from),
            latitude: row.latitude,
            longitude: row.longitude,
            metrics: row.metrics,
        });
    }

    out.extend(grouped(rows, PlaceType::State, |row| row.state.as_str()));
    out.extend(grouped(rows, PlaceType::Region, |row| row.region.as_str()));

    log::debug!(
        "Rollup: expanded {} joined rows into {} city/state/region rows",
        rows.len(),
        out.len(),
    );

    out
}

/// Groups rows by (key, month) and reduces each group to one row.
fn grouped<'a>(
    rows: &'a [JoinedRecord],
    place_type: PlaceType,
    key: fn(&'a JoinedRecord) -> &'a str,
) -> Vec<AggregatedRow> {
    let mut groups: BTreeMap<(&str, NaiveDate), Vec<&JoinedRecord>> = BTreeMap::new();

    for row in rows {
        groups.entry((key(row), row.month)).or_default().push(row);
    }

    let mut out = Vec::with_capacity(groups.len());

    for ((name, month), group) in &groups {
        let Some(first) = group.first() else {
            continue;
        };

        let place_name = if place_type == PlaceType::Region {
            region_display_name(name)
        } else {
            (*name).to_string()
        };

        let latitudes: Vec<f64> = group.iter().filter_map(|row| row.latitude).collect();
        let longitudes: Vec<f64> = group.iter().filter_map(|row| row.longitude).collect();

        out.push(AggregatedRow {
            place_type,
            place_name,
            month: *month,
            product: first.product.clone(),
            unit: first.unit.clone(),
            gas_station_count: Some(
                group
                    .iter()
                    .filter_map(|row| row.gas_station_count)
                    .map(u64::from)
                    .sum(),
            ),
            latitude: reduce(&latitudes, Reducer::Mean),
            longitude: reduce(&longitudes, Reducer::Mean),
            metrics: PriceMetrics {
                market_price_mean: metric(group, Reducer::Mean, |m| m.market_price_mean),
                market_price_std: metric(group, spread_reducer(), |m| m.market_price_std),
                market_price_min: metric(group, Reducer::Min, |m| m.market_price_min),
                market_price_max: metric(group, Reducer::Max, |m| m.market_price_max),
                market_price_var_coef: metric(group, spread_reducer(), |m| m.market_price_var_coef),
                market_margin: metric(group, Reducer::Mean, |m| m.market_margin),
                dist_price_mean: metric(group, Reducer::Mean, |m| m.dist_price_mean),
                dist_price_std: metric(group, spread_reducer(), |m| m.dist_price_std),
                dist_price_min: metric(group, Reducer::Min, |m| m.dist_price_min),
                dist_price_max: metric(group, Reducer::Max, |m| m.dist_price_max),
                dist_price_var_coef: metric(group, spread_reducer(), |m| m.dist_price_var_coef),
            },
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use fuel_map_survey_models::PriceRecord;

    use super::*;

    fn joined(
        city: &str,
        state: &str,
        region: &str,
        month: u32,
        count: u32,
        price_mean: f64,
    ) -> JoinedRecord {
        JoinedRecord::new(
            PriceRecord {
                month: NaiveDate::from_ymd_opt(2019, month, 1).unwrap(),
                product: "GASOLINA COMUM".to_string(),
                city: city.to_string(),
                region: region.to_string(),
                state: state.to_string(),
                gas_station_count: Some(count),
                unit: "R$/l".to_string(),
                metrics: PriceMetrics {
                    market_price_mean: Some(price_mean),
                    market_price_min: Some(price_mean - 0.5),
                    market_price_max: Some(price_mean + 0.5),
                    market_price_std: Some(0.1),
                    ..PriceMetrics::default()
                },
            },
            Some(-23.5),
            Some(-46.6),
        )
    }

    #[test]
    fn city_rows_pass_through_one_to_one() {
        let rows = vec![
            joined("SAO PAULO", "SAO PAULO", "SUDESTE", 1, 10, 4.5),
            joined("SAO PAULO", "SAO PAULO", "SUDESTE", 1, 10, 4.5),
            joined("CAMPINAS", "SAO PAULO", "SUDESTE", 1, 5, 4.3),
        ];

        let aggregated = aggregate(&rows);
        let city_rows: Vec<_> = aggregated
            .iter()
            .filter(|r| r.place_type == PlaceType::City)
            .collect();

        assert_eq!(city_rows.len(), rows.len());
        assert_eq!(city_rows[0].gas_station_count, Some(10));
        assert_eq!(city_rows[0].metrics.market_price_mean, Some(4.5));
    }

    #[test]
    fn state_sum_reducer_conserves_counts() {
        let rows = vec![
            joined("SAO PAULO", "SAO PAULO", "SUDESTE", 1, 10, 4.5),
            joined("CAMPINAS", "SAO PAULO", "SUDESTE", 1, 5, 4.3),
            joined("CURITIBA", "PARANA", "SUL", 1, 7, 4.1),
        ];

        let aggregated = aggregate(&rows);

        let city_total: u64 = rows.iter().filter_map(|r| r.gas_station_count).map(u64::from).sum();
        let state_total: u64 = aggregated
            .iter()
            .filter(|r| r.place_type == PlaceType::State)
            .filter_map(|r| r.gas_station_count)
            .sum();

        assert_eq!(state_total, city_total);
    }

    #[test]
    fn single_element_mean_is_identity() {
        let rows = vec![joined("SAO PAULO", "SAO PAULO", "SUDESTE", 1, 10, 4.5)];

        let aggregated = aggregate(&rows);
        let state_row = aggregated
            .iter()
            .find(|r| r.place_type == PlaceType::State)
            .unwrap();

        assert_eq!(state_row.place_name, "SAO PAULO");
        assert_eq!(state_row.gas_station_count, Some(10));
        assert_eq!(state_row.metrics.market_price_mean, Some(4.5));
        assert_eq!(state_row.latitude, Some(-23.5));
    }

    #[test]
    fn state_groups_use_level_reducers() {
        let rows = vec![
            joined("SAO PAULO", "SAO PAULO", "SUDESTE", 1, 10, 4.5),
            joined("CAMPINAS", "SAO PAULO", "SUDESTE", 1, 6, 4.1),
        ];

        let aggregated = aggregate(&rows);
        let state_row = aggregated
            .iter()
            .find(|r| r.place_type == PlaceType::State)
            .unwrap();

        assert_eq!(state_row.gas_station_count, Some(16));
        assert_eq!(state_row.metrics.market_price_mean, Some(4.3));
        assert_eq!(state_row.metrics.market_price_min, Some(3.6));
        assert_eq!(state_row.metrics.market_price_max, Some(5.0));
        // Spread metrics use the mean-of-std parity policy.
        assert_eq!(state_row.metrics.market_price_std, Some(0.1));
    }

    #[test]
    fn region_rows_carry_display_prefix() {
        let rows = vec![joined("CURITIBA", "PARANA", "SUL", 1, 7, 4.1)];

        let aggregated = aggregate(&rows);
        let region_row = aggregated
            .iter()
            .find(|r| r.place_type == PlaceType::Region)
            .unwrap();

        assert_eq!(region_row.place_name, "REGIAO SUL");
        assert_eq!(region_row.gas_station_count, Some(7));
    }

    #[test]
    fn months_group_separately() {
        let rows = vec![
            joined("SAO PAULO", "SAO PAULO", "SUDESTE", 1, 10, 4.5),
            joined("SAO PAULO", "SAO PAULO", "SUDESTE", 2, 12, 4.6),
        ];

        let aggregated = aggregate(&rows);
        let state_rows: Vec<_> = aggregated
            .iter()
            .filter(|r| r.place_type == PlaceType::State)
            .collect();

        assert_eq!(state_rows.len(), 2);
        assert_eq!(state_rows[0].gas_station_count, Some(10));
        assert_eq!(state_rows[1].gas_station_count, Some(12));
    }

    #[test]
    fn missing_cells_are_skipped_by_reducers() {
        let mut incomplete = joined("CAMPINAS", "SAO PAULO", "SUDESTE", 1, 6, 4.1);
        incomplete.metrics.market_price_mean = None;
        incomplete.gas_station_count = None;
        let rows = vec![joined("SAO PAULO", "SAO PAULO", "SUDESTE", 1, 10, 4.5), incomplete];

        let aggregated = aggregate(&rows);
        let state_row = aggregated
            .iter()
            .find(|r| r.place_type == PlaceType::State)
            .unwrap();

        assert_eq!(state_row.metrics.market_price_mean, Some(4.5));
        assert_eq!(state_row.gas_station_count, Some(10));
    }

    #[test]
    fn empty_input_expands_to_empty() {
        assert!(aggregate(&[]).is_empty());
    }
}
