#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Source schema types and the canonical normalized site record.
//!
//! Every cultural infrastructure export (prepared CSV, raw equipment export,
//! per-commune heatmap export, ...) is described by a [`SourceSchema`] and
//! normalizes into [`SiteRecord`] values that the rest of the pipeline works
//! with.

use culture_map_culture_models::SiteCategory;
use serde::{Deserialize, Serialize};

/// A cultural infrastructure site normalized to the canonical schema.
///
/// Coordinates are optional here: the normalizer never rejects a row for a
/// bad coordinate, it leaves it `None` and the coordinate filter drops it
/// from spatial outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteRecord {
    /// Municipality the site belongs to. Never empty.
    pub commune_name: String,
    /// Postal or INSEE code of the commune. Empty when the source lacks it.
    pub commune_code: String,
    /// Fine-grained infrastructure type (e.g. "Musée", "Théâtre").
    pub infrastructure_type: String,
    /// Display label. Falls back to the type when the source has no name.
    pub infrastructure_name: String,
    /// Latitude (WGS84). `None` if missing or unparseable.
    pub latitude: Option<f64>,
    /// Longitude (WGS84). `None` if missing or unparseable.
    pub longitude: Option<f64>,
    /// Category derived from the infrastructure type.
    pub category: SiteCategory,
    /// Total population of the commune, if known.
    pub population: Option<f64>,
    /// Number of sites the row stands for. Per-commune type counts carry
    /// more than one; per-site exports always carry 1.
    #[serde(default = "one")]
    pub count: u64,
}

const fn one() -> u64 {
    1
}

impl SiteRecord {
    /// Returns `(latitude, longitude)` when both are present.
    #[must_use]
    pub const fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }
}

/// A tabular source format and how its columns map onto [`SiteRecord`].
///
/// Loaded from TOML files embedded at compile time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSchema {
    /// Unique identifier (e.g., `"equipements_communes"`).
    pub id: String,
    /// Human-readable description of the export.
    pub name: String,
    /// Field delimiter: `","`, `";"` or `"\t"`.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    /// Column name mappings for normalization.
    pub fields: FieldMapping,
}

fn default_delimiter() -> String {
    ",".to_string()
}

/// Maps source-specific column names to canonical site fields.
///
/// Each entry is a list of candidate column names tried in order; the first
/// column that is present with a non-empty value wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Commune name columns.
    pub commune_name: Vec<String>,
    /// Postal or INSEE code columns.
    pub commune_code: Vec<String>,
    /// Infrastructure type columns.
    pub infrastructure_type: Vec<String>,
    /// Display name columns. Empty when the source has none.
    #[serde(default)]
    pub infrastructure_name: Vec<String>,
    /// Latitude columns.
    pub latitude: Vec<String>,
    /// Longitude columns.
    pub longitude: Vec<String>,
    /// Commune population columns. Empty when the source has none.
    #[serde(default)]
    pub population: Vec<String>,
    /// Site count columns. Rows count as one site when empty or blank.
    #[serde(default)]
    pub count: Vec<String>,
}

impl FieldMapping {
    /// Returns the fields that must resolve to a header column, paired with
    /// their canonical names.
    #[must_use]
    pub fn required(&self) -> [(&'static str, &[String]); 5] {
        [
            ("commune_name", self.commune_name.as_slice()),
            ("commune_code", self.commune_code.as_slice()),
            ("infrastructure_type", self.infrastructure_type.as_slice()),
            ("latitude", self.latitude.as_slice()),
            ("longitude", self.longitude.as_slice()),
        ]
    }
}
