#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Cultural infrastructure category taxonomy.
//!
//! Every site is placed in exactly one of two top-level categories. The
//! mapping from a source's infrastructure type label to a category lives in
//! `culture_map_source::type_mapping`; this crate only defines the categories
//! themselves and the presentation attributes attached to them.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Top-level cultural site category.
///
/// Parsing accepts both the canonical snake case names and the French labels
/// used by the open-data exports (`patrimoine`, `spectacle_vivant`).
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
    Default,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SiteCategory {
    /// Static heritage: monuments, museums, archives, parks, protected spaces.
    /// Also the fallback for unrecognized infrastructure types.
    #[default]
    #[serde(alias = "patrimoine")]
    #[strum(to_string = "heritage", serialize = "patrimoine")]
    Heritage,
    /// Performance and media venues such as theaters, cinemas, libraries
    /// and music schools.
    #[serde(alias = "spectacle_vivant")]
    #[strum(to_string = "live_performance", serialize = "spectacle_vivant")]
    LivePerformance,
}

impl SiteCategory {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Heritage, Self::LivePerformance]
    }

    /// Label used by the French source exports.
    #[must_use]
    pub const fn french_label(self) -> &'static str {
        match self {
            Self::Heritage => "patrimoine",
            Self::LivePerformance => "spectacle_vivant",
        }
    }

    /// Marker color used by the map renderer.
    #[must_use]
    pub const fn marker_color(self) -> &'static str {
        match self {
            Self::Heritage => "blue",
            Self::LivePerformance => "red",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_and_french_names() {
        assert_eq!(
            "heritage".parse::<SiteCategory>().unwrap(),
            SiteCategory::Heritage
        );
        assert_eq!(
            "patrimoine".parse::<SiteCategory>().unwrap(),
            SiteCategory::Heritage
        );
        assert_eq!(
            "LIVE_PERFORMANCE".parse::<SiteCategory>().unwrap(),
            SiteCategory::LivePerformance
        );
        assert_eq!(
            "spectacle_vivant".parse::<SiteCategory>().unwrap(),
            SiteCategory::LivePerformance
        );
        assert!("opera".parse::<SiteCategory>().is_err());
    }

    #[test]
    fn display_uses_canonical_name() {
        assert_eq!(SiteCategory::Heritage.to_string(), "heritage");
        assert_eq!(SiteCategory::LivePerformance.to_string(), "live_performance");
    }

    #[test]
    fn serde_accepts_french_alias() {
        let cat: SiteCategory = serde_json::from_str("\"spectacle_vivant\"").unwrap();
        assert_eq!(cat, SiteCategory::LivePerformance);
        assert_eq!(
            serde_json::to_string(&SiteCategory::LivePerformance).unwrap(),
            "\"live_performance\""
        );
    }

    #[test]
    fn default_is_heritage() {
        assert_eq!(SiteCategory::default(), SiteCategory::Heritage);
    }
}
