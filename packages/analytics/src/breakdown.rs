//! Category/type breakdowns for the visualization panel and the distinct
//! values offered by the sidebar filters.

use std::collections::{BTreeSet, HashMap};

use culture_map_analytics_models::{CategoryTypeCount, CommuneProfile, FilterOptions};
use culture_map_culture_models::SiteCategory;
use culture_map_source_models::SiteRecord;

/// Counts sites per `(category, type)`, summing each row's `count`.
///
/// Sorted by count descending, then category, then type. `share` is the
/// percentage of all counted sites.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn category_type_counts(sites: &[SiteRecord]) -> Vec<CategoryTypeCount> {
    let mut counts: HashMap<(SiteCategory, &str), u64> = HashMap::new();
    for site in sites {
        *counts
            .entry((site.category, site.infrastructure_type.as_str()))
            .or_default() += site.count;
    }

    let total = counts.values().sum::<u64>() as f64;
    let mut rows: Vec<CategoryTypeCount> = counts
        .into_iter()
        .map(|((category, infrastructure_type), count)| CategoryTypeCount {
            category,
            infrastructure_type: infrastructure_type.to_string(),
            count,
            share: if total > 0.0 {
                count as f64 * 100.0 / total
            } else {
                0.0
            },
        })
        .collect();
    rows.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then(a.category.cmp(&b.category))
            .then_with(|| a.infrastructure_type.cmp(&b.infrastructure_type))
    });
    rows
}

/// Builds the breakdown panel for one commune, matched by exact name.
///
/// Returns `None` if no site belongs to `commune`.
#[must_use]
pub fn commune_profile(sites: &[SiteRecord], commune: &str) -> Option<CommuneProfile> {
    let matching: Vec<SiteRecord> = sites
        .iter()
        .filter(|s| s.commune_name == commune)
        .cloned()
        .collect();
    let first = matching.first()?;

    Some(CommuneProfile {
        commune_name: first.commune_name.clone(),
        commune_code: matching
            .iter()
            .map(|s| s.commune_code.as_str())
            .find(|code| !code.is_empty())
            .unwrap_or_default()
            .to_string(),
        population: matching.iter().find_map(|s| s.population),
        total_sites: matching.iter().map(|s| s.count).sum(),
        breakdown: category_type_counts(&matching),
    })
}

/// Collects the sorted distinct communes, categories and types in `sites`.
#[must_use]
pub fn filter_options(sites: &[SiteRecord]) -> FilterOptions {
    let mut communes = BTreeSet::new();
    let mut categories = BTreeSet::new();
    let mut types = BTreeSet::new();
    for site in sites {
        communes.insert(site.commune_name.as_str());
        categories.insert(site.category);
        types.insert(site.infrastructure_type.as_str());
    }

    FilterOptions {
        communes: communes.into_iter().map(str::to_string).collect(),
        categories: categories.into_iter().collect(),
        types: types.into_iter().map(str::to_string).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{paris_lyon, site};

    #[test]
    fn counts_sorted_by_count_then_category() {
        let mut sites = paris_lyon();
        sites.push(site("Nice", "06000", "Theater", 43.7, 7.27, 340_000.0));

        let rows = category_type_counts(&sites);

        assert_eq!(rows.len(), 2);
        // Both have two sites; heritage sorts first.
        assert_eq!(rows[0].category, SiteCategory::Heritage);
        assert_eq!(rows[0].infrastructure_type, "Museum");
        assert_eq!(rows[0].count, 2);
        assert!((rows[0].share - 50.0).abs() < f64::EPSILON);
        assert_eq!(rows[1].category, SiteCategory::LivePerformance);
    }

    #[test]
    fn shares_sum_to_one_hundred() {
        let sites = vec![
            site("A", "1", "Musée", 45.0, 2.0, 1.0),
            site("A", "1", "Cinéma", 45.0, 2.0, 1.0),
            site("A", "1", "Cinéma", 45.0, 2.0, 1.0),
        ];

        let rows = category_type_counts(&sites);
        let sum: f64 = rows.iter().map(|r| r.share).sum();

        assert_eq!(rows[0].infrastructure_type, "Cinéma");
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn weights_rows_by_count() {
        let mut cinemas = site("Lyon", "69123", "Cinéma", 45.76, 4.83, 500_000.0);
        cinemas.count = 3;
        let sites = vec![cinemas, site("Lyon", "69123", "Musée", 45.76, 4.83, 500_000.0)];

        let rows = category_type_counts(&sites);
        let profile = commune_profile(&sites, "Lyon").unwrap();

        assert_eq!(rows[0].infrastructure_type, "Cinéma");
        assert_eq!(rows[0].count, 3);
        assert!((rows[0].share - 75.0).abs() < 1e-9);
        assert_eq!(profile.total_sites, 4);
    }

    #[test]
    fn no_sites_no_counts() {
        assert!(category_type_counts(&[]).is_empty());
    }

    #[test]
    fn profiles_a_commune() {
        let profile = commune_profile(&paris_lyon(), "Paris").unwrap();

        assert_eq!(profile.commune_code, "75001");
        assert_eq!(profile.population, Some(2_000_000.0));
        assert_eq!(profile.total_sites, 2);
        assert_eq!(profile.breakdown.len(), 2);
    }

    #[test]
    fn unknown_commune_has_no_profile() {
        assert!(commune_profile(&paris_lyon(), "Marseille").is_none());
    }

    #[test]
    fn options_are_sorted_and_unique() {
        let mut sites = paris_lyon();
        sites.push(site("Amiens", "80000", "Museum", 49.89, 2.3, 133_000.0));

        let options = filter_options(&sites);

        assert_eq!(options.communes, vec!["Amiens", "Lyon", "Paris"]);
        assert_eq!(
            options.categories,
            vec![SiteCategory::Heritage, SiteCategory::LivePerformance]
        );
        assert_eq!(options.types, vec!["Museum", "Theater"]);
    }
}
