#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the culture map server.
//!
//! Pipeline tables (`CommuneTable`, `DensityPoint`, ...) are serialized as
//! they are; this crate holds the types that only exist at the HTTP
//! boundary: query parameters, the map viewport and small envelopes.

use std::collections::BTreeMap;

use culture_map_analytics_models::SiteFilter;
use culture_map_culture_models::SiteCategory;
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// A WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatLng {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

/// Rectangle the map is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapBounds {
    /// South-west corner.
    pub south_west: LatLng,
    /// North-east corner.
    pub north_east: LatLng,
}

/// Map viewport settings for the frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMapConfig {
    /// Initial map center.
    pub center: LatLng,
    /// Panning limits.
    pub bounds: MapBounds,
    /// Initial zoom level.
    pub zoom: u8,
    /// Minimum zoom level.
    pub min_zoom: u8,
    /// Maximum zoom level.
    pub max_zoom: u8,
    /// Marker color per category.
    pub category_colors: BTreeMap<SiteCategory, String>,
    /// Upper bound of the density color scale.
    pub density_ceiling: f64,
}

impl ApiMapConfig {
    /// Metropolitan France viewport.
    #[must_use]
    pub fn france(density_ceiling: f64) -> Self {
        Self {
            center: LatLng {
                lat: 46.603_354,
                lng: 1.888_334,
            },
            bounds: MapBounds {
                south_west: LatLng {
                    lat: 41.333,
                    lng: -4.833,
                },
                north_east: LatLng {
                    lat: 51.2,
                    lng: 9.833,
                },
            },
            zoom: 6,
            min_zoom: 6,
            max_zoom: 18,
            category_colors: SiteCategory::all()
                .iter()
                .map(|c| (*c, c.marker_color().to_string()))
                .collect(),
            density_ceiling,
        }
    }
}

/// Query parameters shared by the filtered endpoints.
///
/// List values are separated by [`LIST_SEPARATOR`]. Type labels such as
/// "Cinéma, audiovisuel" contain commas, so commas are kept as part of a
/// value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteQueryParams {
    /// Category names (`heritage`, `live_performance` or the French names).
    pub categories: Option<String>,
    /// Exact infrastructure type labels.
    pub types: Option<String>,
    /// Exact commune name.
    pub commune: Option<String>,
}

/// Separator between values of a list query parameter.
pub const LIST_SEPARATOR: char = '|';

fn split_list(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or_default()
        .split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

impl SiteQueryParams {
    /// Converts the parameters into a [`SiteFilter`]. Unknown category names
    /// are dropped with a warning.
    #[must_use]
    pub fn to_filter(&self) -> SiteFilter {
        let categories = split_list(self.categories.as_deref())
            .filter_map(|name| match name.parse::<SiteCategory>() {
                Ok(category) => Some(category),
                Err(_) => {
                    log::warn!("Ignoring unknown category '{name}'");
                    None
                }
            })
            .collect();
        let types = split_list(self.types.as_deref())
            .map(str::to_string)
            .collect();
        let commune = self
            .commune
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        SiteFilter {
            categories,
            types,
            commune,
        }
    }
}

/// Chat request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiChatRequest {
    /// The user's question.
    pub message: String,
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}

impl ApiError {
    /// Creates an error body.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
