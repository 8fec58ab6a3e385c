#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Per-commune aggregate, density and filter types.
//!
//! These are the output tables of the aggregation pipeline and the
//! parameters that select which sites feed it. They are consumed by the map,
//! visualization and filter renderers through the server API.

use std::collections::BTreeSet;

use culture_map_culture_models::SiteCategory;
use culture_map_source_models::SiteRecord;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Default ceiling applied to density for the color scale.
pub const DEFAULT_DENSITY_CEILING: f64 = 10.0;

/// Which site field identifies a commune when grouping.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GroupKey {
    /// Postal or INSEE code.
    Code,
    /// Commune name.
    Name,
}

impl GroupKey {
    /// Returns the key value of `site` for this grouping.
    #[must_use]
    pub fn of(self, site: &SiteRecord) -> &str {
        match self {
            Self::Code => &site.commune_code,
            Self::Name => &site.commune_name,
        }
    }
}

/// How the aggregator picks its [`GroupKey`].
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum GroupKeyPolicy {
    /// Code when every site has one, otherwise name for the whole run.
    #[default]
    Auto,
    /// Always group by code.
    Code,
    /// Always group by name.
    Name,
}

/// Per-commune totals produced by the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommuneAggregate {
    /// Commune name (first seen in the group).
    pub commune_name: String,
    /// Postal or INSEE code (first non-empty in the group).
    pub commune_code: String,
    /// Representative latitude (first non-null in the group).
    pub latitude: Option<f64>,
    /// Representative longitude (first non-null in the group).
    pub longitude: Option<f64>,
    /// Number of sites in the commune.
    pub total_sites: u64,
    /// Number of heritage sites.
    pub heritage_sites: u64,
    /// Number of live performance sites.
    pub live_performance_sites: u64,
    /// Commune population (first non-null in the group, 0 when unknown).
    pub population: f64,
    /// Sites per 1,000 inhabitants. `None` when population is not positive.
    pub density_per_1000: Option<f64>,
}

/// The aggregator's output together with the key it grouped by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommuneTable {
    /// The grouping key used for this run.
    pub key: GroupKey,
    /// One row per commune, in first-seen input order.
    pub communes: Vec<CommuneAggregate>,
}

/// One commune in the color-scaled density view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DensityPoint {
    /// Commune name.
    pub commune_name: String,
    /// Postal or INSEE code.
    pub commune_code: String,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Number of sites (used for marker size).
    pub total_sites: u64,
    /// Sites per 1,000 inhabitants.
    pub density_per_1000: f64,
    /// Density clamped to the color-scale ceiling. Display only.
    pub density_clipped: f64,
}

/// A site row joined with its commune's density.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteWithDensity {
    /// The site.
    #[serde(flatten)]
    pub site: SiteRecord,
    /// Density of the site's commune, if defined.
    pub commune_density_per_1000: Option<f64>,
}

/// Number of sites for one `(category, type)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTypeCount {
    /// Site category.
    pub category: SiteCategory,
    /// Infrastructure type label.
    pub infrastructure_type: String,
    /// Number of sites.
    pub count: u64,
    /// Percentage of all counted sites.
    pub share: f64,
}

/// Breakdown of one commune's sites for the visualization panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommuneProfile {
    /// Commune name.
    pub commune_name: String,
    /// Postal or INSEE code.
    pub commune_code: String,
    /// Commune population, if known.
    pub population: Option<f64>,
    /// Total sites in the commune.
    pub total_sites: u64,
    /// Per category/type counts.
    pub breakdown: Vec<CategoryTypeCount>,
}

/// Distinct values offered by the sidebar filter widgets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// Sorted unique commune names.
    pub communes: Vec<String>,
    /// Categories present in the data.
    pub categories: Vec<SiteCategory>,
    /// Sorted unique infrastructure types.
    pub types: Vec<String>,
}

/// Sites dropped by the coordinate filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinateReport {
    /// Sites that passed.
    pub kept: u64,
    /// Sites with a missing latitude or longitude.
    pub missing: u64,
    /// Sites with a coordinate outside WGS84 bounds.
    pub out_of_range: u64,
}

impl CoordinateReport {
    /// Total sites dropped.
    #[must_use]
    pub const fn dropped(&self) -> u64 {
        self.missing + self.out_of_range
    }
}

/// Category/type/commune restriction applied to the site table.
///
/// Empty sets and `None` mean "no restriction". Sets are ordered so that
/// equal filters hash equally and can key a cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteFilter {
    /// Allowed categories.
    #[serde(default)]
    pub categories: BTreeSet<SiteCategory>,
    /// Allowed infrastructure types (exact labels).
    #[serde(default)]
    pub types: BTreeSet<String>,
    /// Exact commune name.
    #[serde(default)]
    pub commune: Option<String>,
}

impl SiteFilter {
    /// Returns `true` if no criterion is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
            && self.types.is_empty()
            && self.commune.as_deref().is_none_or(str::is_empty)
    }

    /// Returns `true` if `site` satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, site: &SiteRecord) -> bool {
        if !self.categories.is_empty() && !self.categories.contains(&site.category) {
            return false;
        }
        if !self.types.is_empty() && !self.types.contains(&site.infrastructure_type) {
            return false;
        }
        match self.commune.as_deref() {
            Some(commune) if !commune.is_empty() => site.commune_name == commune,
            _ => true,
        }
    }
}
