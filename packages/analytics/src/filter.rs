//! Category/type/commune restriction of the site table.

use culture_map_analytics_models::SiteFilter;
use culture_map_source_models::SiteRecord;

/// Returns the sites matching every criterion of `filter`, in input order.
///
/// An empty filter returns the input unchanged.
#[must_use]
pub fn filter_sites(sites: &[SiteRecord], filter: &SiteFilter) -> Vec<SiteRecord> {
    if filter.is_empty() {
        return sites.to_vec();
    }
    sites
        .iter()
        .filter(|site| filter.matches(site))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use culture_map_culture_models::SiteCategory;

    use super::*;
    use crate::test_support::{paris_lyon, site};

    #[test]
    fn empty_filter_is_identity() {
        let sites = paris_lyon();
        assert_eq!(filter_sites(&sites, &SiteFilter::default()), sites);
    }

    #[test]
    fn empty_commune_string_is_no_restriction() {
        let sites = paris_lyon();
        let filter = SiteFilter {
            commune: Some(String::new()),
            ..SiteFilter::default()
        };
        assert_eq!(filter_sites(&sites, &filter).len(), 3);
    }

    #[test]
    fn filters_by_category() {
        let filter = SiteFilter {
            categories: BTreeSet::from([SiteCategory::LivePerformance]),
            ..SiteFilter::default()
        };

        let out = filter_sites(&paris_lyon(), &filter);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].infrastructure_type, "Theater");
    }

    #[test]
    fn criteria_are_anded() {
        let filter = SiteFilter {
            types: BTreeSet::from(["Museum".to_string()]),
            commune: Some("Lyon".to_string()),
            ..SiteFilter::default()
        };

        let out = filter_sites(&paris_lyon(), &filter);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].commune_name, "Lyon");
    }

    #[test]
    fn commune_match_is_exact() {
        let filter = SiteFilter {
            commune: Some("paris".to_string()),
            ..SiteFilter::default()
        };
        assert!(filter_sites(&paris_lyon(), &filter).is_empty());
    }

    #[test]
    fn filtering_is_idempotent_and_composes() {
        let mut sites = paris_lyon();
        sites.push(site("Lyon", "69001", "Théâtre", 45.76, 4.83, 0.0));
        let by_type = SiteFilter {
            types: BTreeSet::from(["Museum".to_string(), "Théâtre".to_string()]),
            ..SiteFilter::default()
        };
        let by_commune = SiteFilter {
            commune: Some("Lyon".to_string()),
            ..SiteFilter::default()
        };
        let both = SiteFilter {
            types: by_type.types.clone(),
            commune: by_commune.commune.clone(),
            ..SiteFilter::default()
        };

        let once = filter_sites(&sites, &by_type);
        assert_eq!(filter_sites(&once, &by_type), once);
        assert_eq!(
            filter_sites(&filter_sites(&sites, &by_type), &by_commune),
            filter_sites(&sites, &both)
        );
    }
}
