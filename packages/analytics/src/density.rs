//! Density computation, the color-scaled density view and the join of
//! commune density back onto each site.

use std::cmp::Ordering;
use std::collections::HashMap;

use culture_map_analytics_models::{CommuneAggregate, DensityPoint, GroupKey, SiteWithDensity};
use culture_map_source_models::SiteRecord;

/// Sites per 1,000 inhabitants, or `None` when `population` is not a
/// positive finite number.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn density_per_1000(total_sites: u64, population: f64) -> Option<f64> {
    if !(population.is_finite() && population > 0.0) {
        return None;
    }
    let density = total_sites as f64 * 1000.0 / population;
    density.is_finite().then_some(density)
}

/// Builds the heatmap rows: communes with a density and coordinates, with
/// the density clamped to `ceiling` for the color scale.
///
/// `ceiling` is validated at configuration time; the canonical density is
/// kept alongside the clipped one.
#[must_use]
pub fn density_view(aggregates: &[CommuneAggregate], ceiling: f64) -> Vec<DensityPoint> {
    aggregates
        .iter()
        .filter_map(|agg| {
            let density = agg.density_per_1000.filter(|d| d.is_finite())?;
            Some(DensityPoint {
                commune_name: agg.commune_name.clone(),
                commune_code: agg.commune_code.clone(),
                latitude: agg.latitude?,
                longitude: agg.longitude?,
                total_sites: agg.total_sites,
                density_per_1000: density,
                density_clipped: density.min(ceiling),
            })
        })
        .collect()
}

/// Left-joins each site with the density of its commune, matching on the
/// same `key` the aggregates were grouped by.
#[must_use]
pub fn join_density(
    sites: &[SiteRecord],
    aggregates: &[CommuneAggregate],
    key: GroupKey,
) -> Vec<SiteWithDensity> {
    let by_key: HashMap<&str, Option<f64>> = aggregates
        .iter()
        .map(|agg| {
            let id = match key {
                GroupKey::Code => agg.commune_code.as_str(),
                GroupKey::Name => agg.commune_name.as_str(),
            };
            (id, agg.density_per_1000)
        })
        .collect();

    sites
        .iter()
        .map(|site| SiteWithDensity {
            site: site.clone(),
            commune_density_per_1000: by_key.get(key.of(site)).copied().flatten(),
        })
        .collect()
}

/// Communes with a density, highest first, ties broken by name.
///
/// Returns at most `limit` communes.
#[must_use]
pub fn rank_by_density(aggregates: &[CommuneAggregate], limit: usize) -> Vec<CommuneAggregate> {
    let mut ranked: Vec<CommuneAggregate> = aggregates
        .iter()
        .filter(|agg| agg.density_per_1000.is_some())
        .cloned()
        .collect();
    ranked.sort_by(|a, b| {
        let da = a.density_per_1000.unwrap_or_default();
        let db = b.density_per_1000.unwrap_or_default();
        db.partial_cmp(&da)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.commune_name.cmp(&b.commune_name))
    });
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use culture_map_analytics_models::{DEFAULT_DENSITY_CEILING, GroupKeyPolicy};

    use super::*;
    use crate::aggregate::aggregate;
    use crate::test_support::{paris_lyon, site};

    #[test]
    fn density_requires_positive_population() {
        assert_eq!(density_per_1000(3, 0.0), None);
        assert_eq!(density_per_1000(3, -5.0), None);
        assert_eq!(density_per_1000(3, f64::NAN), None);
        assert!((density_per_1000(3, 1500.0).unwrap() - 2.0).abs() < f64::EPSILON);
        assert_eq!(density_per_1000(0, 1500.0), Some(0.0));
    }

    #[test]
    fn density_view_excludes_communes_without_density() {
        let table = aggregate(&paris_lyon(), GroupKeyPolicy::Auto);

        let view = density_view(&table.communes, DEFAULT_DENSITY_CEILING);

        assert_eq!(view.len(), 1);
        assert_eq!(view[0].commune_name, "Paris");
        assert!((view[0].density_per_1000 - 0.001).abs() < f64::EPSILON);
        assert!((view[0].density_clipped - 0.001).abs() < f64::EPSILON);
    }

    #[test]
    fn density_view_clips_at_ceiling() {
        let sites = vec![
            site("Gavarnie", "65192", "Monument", 42.73, -0.01, 100.0),
            site("Gavarnie", "65192", "Musée", 42.73, -0.01, 100.0),
        ];
        let table = aggregate(&sites, GroupKeyPolicy::Auto);

        let view = density_view(&table.communes, DEFAULT_DENSITY_CEILING);

        assert!((view[0].density_per_1000 - 20.0).abs() < f64::EPSILON);
        assert!((view[0].density_clipped - DEFAULT_DENSITY_CEILING).abs() < f64::EPSILON);
        for point in &view {
            assert!(point.density_clipped <= DEFAULT_DENSITY_CEILING);
            assert!(point.density_clipped <= point.density_per_1000);
        }
    }

    #[test]
    fn density_view_skips_communes_without_coordinates() {
        let mut sites = paris_lyon();
        for s in &mut sites {
            s.latitude = None;
        }
        let table = aggregate(&sites, GroupKeyPolicy::Auto);

        assert!(density_view(&table.communes, DEFAULT_DENSITY_CEILING).is_empty());
    }

    #[test]
    fn join_attaches_commune_density() {
        let sites = paris_lyon();
        let table = aggregate(&sites, GroupKeyPolicy::Auto);

        let joined = join_density(&sites, &table.communes, table.key);

        assert_eq!(joined.len(), 3);
        assert!((joined[0].commune_density_per_1000.unwrap() - 0.001).abs() < f64::EPSILON);
        assert_eq!(joined[0].commune_density_per_1000, joined[1].commune_density_per_1000);
        assert_eq!(joined[2].commune_density_per_1000, None);
        assert_eq!(joined[2].site, sites[2]);
    }

    #[test]
    fn joined_site_serializes_flat() {
        let sites = paris_lyon();
        let table = aggregate(&sites, GroupKeyPolicy::Auto);
        let joined = join_density(&sites[..1], &table.communes, table.key);

        let value = serde_json::to_value(&joined[0]).unwrap();

        assert_eq!(value["communeName"], "Paris");
        assert_eq!(value["category"], "heritage");
        assert!(value["communeDensityPer1000"].is_number());
    }

    #[test]
    fn ranks_by_unclipped_density() {
        let sites = vec![
            site("Bordeaux", "33000", "Musée", 44.84, -0.58, 1000.0),
            site("Arles", "13200", "Musée", 43.68, 4.63, 100.0),
            site("Arles", "13200", "Monument", 43.68, 4.63, 100.0),
            site("Albi", "81000", "Musée", 43.93, 2.15, 1000.0),
            site("Lyon", "69001", "Musée", 45.76, 4.83, 0.0),
        ];
        let table = aggregate(&sites, GroupKeyPolicy::Auto);

        let ranked = rank_by_density(&table.communes, 10);
        let names: Vec<&str> = ranked.iter().map(|c| c.commune_name.as_str()).collect();

        assert_eq!(names, vec!["Arles", "Albi", "Bordeaux"]);
        assert_eq!(rank_by_density(&table.communes, 1).len(), 1);
    }
}
