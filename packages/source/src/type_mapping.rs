//! Infrastructure type to category mapping.
//!
//! Maps the open-ended infrastructure type labels found in the source
//! exports to the two-way [`SiteCategory`] taxonomy. Labels are matched
//! against fixed membership lists (French labels from the Ministry of
//! Culture exports plus their English equivalents) after trimming and
//! lowercasing.

use culture_map_culture_models::SiteCategory;

/// Heritage type labels (lowercase).
const HERITAGE_TYPES: &[&str] = &[
    "monument",
    "musée",
    "museum",
    "lieu archéologique",
    "archaeological site",
    "service d'archives",
    "archive service",
    "parc et jardin",
    "park and garden",
    "espace protégé",
    "protected space",
];

/// Live performance type labels (lowercase).
const LIVE_PERFORMANCE_TYPES: &[&str] = &[
    "théâtre",
    "theater",
    "theatre",
    "cinéma",
    "cinema",
    "bibliothèque",
    "library",
    "conservatoire",
    "conservatory",
    "scène",
    "stage",
    "musique",
    "music",
    "spectacle vivant",
    "live performance",
    "live-performance venue",
    "pluridisciplinaire",
    "multidisciplinary",
    "multidisciplinary venue",
    "cinéma, audiovisuel",
    "cinema, audiovisual",
    "audiovisual cinema",
    "livre, littérature",
    "book, literature",
    "literature",
];

/// Returns the category for a type label, or `None` when the label is in
/// neither membership list.
#[must_use]
pub fn lookup_category(raw: &str) -> Option<SiteCategory> {
    let key = raw.trim().to_lowercase().replace('\u{2019}', "'");

    if HERITAGE_TYPES.contains(&key.as_str()) {
        return Some(SiteCategory::Heritage);
    }
    if LIVE_PERFORMANCE_TYPES.contains(&key.as_str()) {
        return Some(SiteCategory::LivePerformance);
    }
    None
}

/// Classifies an infrastructure type label.
///
/// Never fails: labels that are not recognized classify as
/// [`SiteCategory::Heritage`].
#[must_use]
pub fn classify(raw: &str) -> SiteCategory {
    lookup_category(raw).unwrap_or_default()
}
