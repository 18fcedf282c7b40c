#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Row and enum types for the fuel price survey pipeline.
//!
//! These types flow through the whole system: the ingest crate produces
//! [`PriceRecord`]/[`PlaceRecord`] values, the places crate joins them into
//! [`JoinedRecord`]s, and the analytics crate rolls those up into
//! [`AggregatedRow`]s for the dashboard layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Display/key prefix attached to region-level place names.
///
/// Keeps a region row (e.g. "REGIAO SUL") from colliding with a state of
/// a similar name in the unioned aggregated table.
pub const REGION_NAME_PREFIX: &str = "REGIAO ";

/// Builds the display/key name for a region-level row.
#[must_use]
pub fn region_display_name(region: &str) -> String {
    format!("{REGION_NAME_PREFIX}{region}")
}

/// Strips the [`REGION_NAME_PREFIX`] from a region place name, returning
/// the bare region value as it appears in the survey rows.
#[must_use]
pub fn strip_region_prefix(place_name: &str) -> &str {
    place_name
        .strip_prefix(REGION_NAME_PREFIX)
        .unwrap_or(place_name)
}

/// The hierarchy level an aggregated row represents.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PlaceType {
    /// A surveyed municipality.
    City,
    /// A Brazilian state (UF).
    State,
    /// One of the five macro-regions.
    Region,
}

impl PlaceType {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::City, Self::State, Self::Region]
    }
}

/// The twelve numeric survey columns, minus the gas-station count.
///
/// Every field is `Option<f64>`: a `None` means the source cell failed
/// numeric coercion and was treated as missing rather than aborting the
/// load. Reducers skip missing values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceMetrics {
    /// Mean pump price across surveyed stations.
    pub market_price_mean: Option<f64>,
    /// Standard deviation of the pump price.
    pub market_price_std: Option<f64>,
    /// Minimum observed pump price.
    pub market_price_min: Option<f64>,
    /// Maximum observed pump price.
    pub market_price_max: Option<f64>,
    /// Coefficient of variation of the pump price.
    pub market_price_var_coef: Option<f64>,
    /// Mean resale margin.
    pub market_margin: Option<f64>,
    /// Mean distributor price.
    pub dist_price_mean: Option<f64>,
    /// Standard deviation of the distributor price.
    pub dist_price_std: Option<f64>,
    /// Minimum observed distributor price.
    pub dist_price_min: Option<f64>,
    /// Maximum observed distributor price.
    pub dist_price_max: Option<f64>,
    /// Coefficient of variation of the distributor price.
    pub dist_price_var_coef: Option<f64>,
}

/// One survey row: a place x month x product observation.
///
/// `(month, city, product)` is not unique in the source data; duplicates
/// are tolerated and flow into downstream aggregation unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRecord {
    /// Survey month, pinned to the first day of the month.
    pub month: NaiveDate,
    /// Product name as spelled in the survey (e.g. "GASOLINA COMUM").
    pub product: String,
    /// City name in the survey spelling: upper-case, accent-free.
    pub city: String,
    /// Macro-region the city belongs to.
    pub region: String,
    /// State the city belongs to.
    pub state: String,
    /// Number of gas stations surveyed; `None` if the cell was malformed.
    pub gas_station_count: Option<u32>,
    /// Unit of measure for the price columns (e.g. "R$/l").
    pub unit: String,
    /// The numeric survey metrics.
    #[serde(flatten)]
    pub metrics: PriceMetrics,
}

/// One gazetteer row: a municipality with its coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceRecord {
    /// Municipality name as spelled in the gazetteer (may carry accents).
    pub name: String,
    /// Two-letter state code (UF).
    pub uf: String,
    /// Latitude; `None` if the cell was malformed.
    pub latitude: Option<f64>,
    /// Longitude; `None` if the cell was malformed.
    pub longitude: Option<f64>,
}

/// A survey row augmented with coordinates from the matched gazetteer
/// entry.
///
/// Built once per ingestion cycle and immutable afterward; every
/// filter/aggregation step produces a new table rather than mutating this
/// one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedRecord {
    /// Survey month, pinned to the first day of the month.
    pub month: NaiveDate,
    /// Product name.
    pub product: String,
    /// City name in the survey spelling.
    pub city: String,
    /// Macro-region.
    pub region: String,
    /// State.
    pub state: String,
    /// Number of gas stations surveyed.
    pub gas_station_count: Option<u32>,
    /// Unit of measure.
    pub unit: String,
    /// The numeric survey metrics.
    #[serde(flatten)]
    pub metrics: PriceMetrics,
    /// Latitude from the gazetteer match; `None` if unmatched.
    pub latitude: Option<f64>,
    /// Longitude from the gazetteer match; `None` if unmatched.
    pub longitude: Option<f64>,
}

impl JoinedRecord {
    /// Attaches gazetteer coordinates to a survey row.
    #[must_use]
    pub fn new(price: PriceRecord, latitude: Option<f64>, longitude: Option<f64>) -> Self {
        Self {
            month: price.month,
            product: price.product,
            city: price.city,
            region: price.region,
            state: price.state,
            gas_station_count: price.gas_station_count,
            unit: price.unit,
            metrics: price.metrics,
            latitude,
            longitude,
        }
    }
}

/// One output row of the aggregator, tagged with the hierarchy level it
/// represents.
///
/// Recomputed on every filter change and handed to the presentation
/// layer; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedRow {
    /// Hierarchy level of this row.
    pub place_type: PlaceType,
    /// Place name: the city name, the state name, or
    /// "REGIAO " + the region name.
    pub place_name: String,
    /// Survey month.
    pub month: NaiveDate,
    /// Product name.
    pub product: String,
    /// Unit of measure.
    pub unit: String,
    /// Gas-station count: passed through for cities, summed for
    /// states/regions.
    pub gas_station_count: Option<u64>,
    /// Latitude: passed through for cities, mean (approximate centroid)
    /// for states/regions.
    pub latitude: Option<f64>,
    /// Longitude: see `latitude`.
    pub longitude: Option<f64>,
    /// The aggregated numeric metrics.
    #[serde(flatten)]
    pub metrics: PriceMetrics,
}
