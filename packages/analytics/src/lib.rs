#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregation pipeline over normalized cultural sites.
//!
//! Each stage is a pure function from one table to a new table:
//! [`filter_located`] drops sites that cannot be placed on the map,
//! [`filter_sites`] applies the sidebar selection, [`aggregate`] groups the
//! result per commune and [`density_view`] turns the aggregates into the
//! color-scaled heatmap rows. The breakdown helpers feed the visualization
//! panel.

pub mod aggregate;
pub mod breakdown;
pub mod coordinates;
pub mod density;
pub mod filter;

pub use aggregate::{aggregate, resolve_group_key};
pub use breakdown::{category_type_counts, commune_profile, filter_options};
pub use coordinates::filter_located;
pub use density::{density_per_1000, density_view, join_density, rank_by_density};
pub use filter::filter_sites;
