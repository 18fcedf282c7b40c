#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Startup context and per-interaction view computation.
//!
//! [`DashboardContext`] is built once at process start: the survey is
//! joined against the gazetteer and the place hierarchy is derived.
//! After that it is read-only, so a host serving multiple UI sessions
//! can share one context across unsynchronized concurrent reads; every
//! interaction computes fresh tables and never touches the base table.
//!
//! One user filter change maps to one [`DashboardContext::view`] call:
//! filter by product and year range, expand the three place levels,
//! select the chosen places, and total the summary badges.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike as _, NaiveDate};
use fuel_map_analytics::{
    AnalyticsError, place_filter::filter_by_places, rollup::aggregate,
    station_count::station_count,
};
use fuel_map_places::hierarchy::PlaceHierarchyIndex;
use fuel_map_places::join::{JoinMode, join};
use fuel_map_survey_models::{AggregatedRow, JoinedRecord, PlaceRecord, PriceRecord};
use serde::{Deserialize, Serialize};

/// One user interaction: the state of the three filter widgets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSelection {
    /// Product chosen in the fuel selector (e.g. "GASOLINA COMUM").
    pub product: String,
    /// Inclusive year range from the period slider.
    pub year_range: (i32, i32),
    /// Place ids chosen in the place selector; may span hierarchy levels.
    pub place_ids: Vec<String>,
}

/// Everything the presentation layer needs to redraw after one
/// interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    /// The filtered aggregated table feeding the map and charts.
    pub rows: Vec<AggregatedRow>,
    /// Overlap-aware gas-station total for the prices badge.
    pub station_count: u64,
    /// Distinct months in the filtered set, for the months badge.
    pub month_count: usize,
    /// Distinct selected places, for the places badge.
    pub place_count: usize,
}

/// The immutable per-process context behind the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardContext {
    base: Vec<JoinedRecord>,
    places: PlaceHierarchyIndex,
    products: Vec<String>,
    years: Vec<i32>,
    product_units: BTreeMap<String, String>,
}

impl DashboardContext {
    /// Joins the survey against the gazetteer and derives the filter
    /// widget inputs. Called once at startup.
    #[must_use]
    pub fn new(price_rows: &[PriceRecord], place_rows: &[PlaceRecord], mode: JoinMode) -> Self {
        let base = join(price_rows, place_rows, mode);
        let places = PlaceHierarchyIndex::build(&base);

        let mut products: BTreeSet<String> = BTreeSet::new();
        let mut years: BTreeSet<i32> = BTreeSet::new();
        let mut product_units: BTreeMap<String, String> = BTreeMap::new();

        for row in &base {
            products.insert(row.product.clone());
            years.insert(row.month.year());
            product_units
                .entry(row.product.clone())
                .or_insert_with(|| row.unit.clone());
        }

        log::info!(
            "Dashboard context ready: {} joined rows, {} products, {} years, {} places",
            base.len(),
            products.len(),
            years.len(),
            places.id_map().len(),
        );

        Self {
            base,
            places,
            products: products.into_iter().collect(),
            years: years.into_iter().collect(),
            product_units,
        }
    }

    /// The joined base table, in survey order.
    #[must_use]
    pub fn base(&self) -> &[JoinedRecord] {
        &self.base
    }

    /// The place hierarchy driving the place-selector widget.
    #[must_use]
    pub const fn places(&self) -> &PlaceHierarchyIndex {
        &self.places
    }

    /// Sorted distinct products, for the fuel selector.
    #[must_use]
    pub fn products(&self) -> &[String] {
        &self.products
    }

    /// Sorted distinct survey years, for the period slider.
    #[must_use]
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Unit-of-measure label per product, for chart titles.
    #[must_use]
    pub const fn product_units(&self) -> &BTreeMap<String, String> {
        &self.product_units
    }

    /// Computes the view for one filter interaction.
    ///
    /// A selection matching zero rows yields an empty view (empty charts,
    /// zero badges), not an error.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError`] if a place id is unrecognized; the
    /// interaction is rejected rather than silently producing a wrong
    /// table.
    pub fn view(&self, selection: &FilterSelection) -> Result<DashboardView, AnalyticsError> {
        let (from_year, to_year) = selection.year_range;

        let slice: Vec<JoinedRecord> = self
            .base
            .iter()
            .filter(|row| row.product == selection.product)
            .filter(|row| {
                let year = row.month.year();
                year >= from_year && year <= to_year
            })
            .cloned()
            .collect();

        let expanded = aggregate(&slice);
        let rows = filter_by_places(&expanded, &selection.place_ids, &self.places)?;

        let months: BTreeSet<NaiveDate> = rows.iter().map(|row| row.month).collect();
        let distinct_places: BTreeSet<&str> =
            selection.place_ids.iter().map(String::as_str).collect();

        Ok(DashboardView {
            station_count: station_count(&rows, &self.base),
            month_count: months.len(),
            place_count: distinct_places.len(),
            rows,
        })
    }
}
