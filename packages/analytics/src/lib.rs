#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Multi-level aggregation, place filtering, and overlap-aware counting.
//!
//! The rollup expands a filtered slice of the joined base table into the
//! unioned city/state/region table the charts consume; the place filter
//! selects rows for a mixed-level place selection; the station counter
//! totals gas-station counts without double counting places subsumed by
//! a selected ancestor.

pub mod place_filter;
pub mod rollup;
pub mod station_count;

use thiserror::Error;

/// Errors that can occur while answering a dashboard query.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalyticsError {
    /// A place id carries no recognized level prefix.
    #[error("Invalid place identifier '{id}': expected a city_/state_/region_ prefix")]
    InvalidPlaceIdentifier {
        /// The offending id.
        id: String,
    },

    /// A well-prefixed place id does not exist in the hierarchy index.
    #[error("Unknown place '{id}': not present in the place index")]
    UnknownPlace {
        /// The offending id.
        id: String,
    },
}
