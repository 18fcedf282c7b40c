#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Place-name normalization, gazetteer join, and place hierarchy index.
//!
//! Survey city names and gazetteer municipality names drift in casing and
//! diacritics, so all matching goes through a canonical form: upper-case
//! ASCII with combining marks stripped. On top of the joined table this
//! crate derives the three-level place hierarchy (city ⊂ state ⊂ region)
//! that drives the dashboard's place selector and aggregation.

pub mod hierarchy;
pub mod join;
pub mod normalize;
