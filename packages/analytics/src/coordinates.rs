//! Drops sites that cannot be placed on the map.

use culture_map_analytics_models::CoordinateReport;
use culture_map_source::parsing::in_wgs84_range;
use culture_map_source_models::SiteRecord;

/// Keeps only sites with both coordinates present, finite and inside WGS84
/// bounds, in input order.
///
/// Zero is a valid coordinate: the Greenwich meridian crosses France.
#[must_use]
pub fn filter_located(sites: &[SiteRecord]) -> (Vec<SiteRecord>, CoordinateReport) {
    let mut report = CoordinateReport::default();
    let mut kept = Vec::with_capacity(sites.len());

    for site in sites {
        match site.coordinates() {
            None => report.missing += 1,
            Some((lat, lng)) if !in_wgs84_range(lat, lng) => {
                log::debug!(
                    "Dropping '{}' in {}: coordinates ({lat}, {lng}) out of range",
                    site.infrastructure_name,
                    site.commune_name
                );
                report.out_of_range += 1;
            }
            Some(_) => kept.push(site.clone()),
        }
    }
    report.kept = kept.len() as u64;

    if report.dropped() > 0 {
        log::info!(
            "Coordinate filter kept {} sites, dropped {} without coordinates and {} out of range",
            report.kept,
            report.missing,
            report.out_of_range
        );
    }

    (kept, report)
}
