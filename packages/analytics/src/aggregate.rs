//! Groups sites per commune.
//!
//! The grouping key is chosen once per run: the postal/INSEE code is the
//! stable join key, but some exports leave it empty, and grouping half the
//! rows by code and half by name would split communes. So `Auto` falls back
//! to the commune name for the whole run as soon as one code is missing.

use std::collections::HashMap;

use culture_map_analytics_models::{CommuneAggregate, CommuneTable, GroupKey, GroupKeyPolicy};
use culture_map_culture_models::SiteCategory;
use culture_map_source_models::SiteRecord;

use crate::density::density_per_1000;

/// Resolves `policy` against the site table.
#[must_use]
pub fn resolve_group_key(sites: &[SiteRecord], policy: GroupKeyPolicy) -> GroupKey {
    match policy {
        GroupKeyPolicy::Code => GroupKey::Code,
        GroupKeyPolicy::Name => GroupKey::Name,
        GroupKeyPolicy::Auto => {
            let missing = sites.iter().filter(|s| s.commune_code.is_empty()).count();
            if missing == 0 {
                GroupKey::Code
            } else {
                log::info!(
                    "{missing} of {} sites have no commune code, grouping by commune name",
                    sites.len()
                );
                GroupKey::Name
            }
        }
    }
}

/// Running totals for one commune.
struct Accumulator {
    aggregate: CommuneAggregate,
    population: Option<f64>,
    divergent: bool,
}

impl Accumulator {
    fn new(site: &SiteRecord) -> Self {
        let (latitude, longitude) = site.coordinates().unzip();
        Self {
            aggregate: CommuneAggregate {
                commune_name: site.commune_name.clone(),
                commune_code: site.commune_code.clone(),
                latitude,
                longitude,
                total_sites: 0,
                heritage_sites: 0,
                live_performance_sites: 0,
                population: 0.0,
                density_per_1000: None,
            },
            population: site.population,
            divergent: false,
        }
    }

    fn add(&mut self, site: &SiteRecord, key: GroupKey) {
        let agg = &mut self.aggregate;
        agg.total_sites += site.count;
        match site.category {
            SiteCategory::Heritage => agg.heritage_sites += site.count,
            SiteCategory::LivePerformance => agg.live_performance_sites += site.count,
        }

        // The non-key identity field takes the first non-empty value.
        match key {
            GroupKey::Code if agg.commune_name.is_empty() => {
                agg.commune_name.clone_from(&site.commune_name);
            }
            GroupKey::Name if agg.commune_code.is_empty() => {
                agg.commune_code.clone_from(&site.commune_code);
            }
            GroupKey::Code => {
                if agg.commune_name != site.commune_name {
                    self.divergent = true;
                }
            }
            GroupKey::Name => {
                if !site.commune_code.is_empty() && agg.commune_code != site.commune_code {
                    self.divergent = true;
                }
            }
        }

        if agg.latitude.is_none()
            && let Some((lat, lng)) = site.coordinates()
        {
            agg.latitude = Some(lat);
            agg.longitude = Some(lng);
        }

        match (self.population, site.population) {
            (None, Some(p)) => self.population = Some(p),
            (Some(first), Some(p)) if (first - p).abs() > f64::EPSILON => self.divergent = true,
            _ => {}
        }
    }

    fn finish(self) -> CommuneAggregate {
        let mut agg = self.aggregate;
        agg.population = self.population.unwrap_or(0.0);
        agg.density_per_1000 = density_per_1000(agg.total_sites, agg.population);
        agg
    }
}

/// Groups `sites` per commune.
///
/// Communes are emitted in the order they first appear in `sites`. Site
/// counts and densities do not depend on row order; the representative
/// coordinates, population and non-key identity field are the first
/// non-null value seen.
#[must_use]
pub fn aggregate(sites: &[SiteRecord], policy: GroupKeyPolicy) -> CommuneTable {
    let key = resolve_group_key(sites, policy);
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Accumulator> = Vec::new();

    for site in sites {
        let slot = *index.entry(key.of(site)).or_insert_with(|| {
            groups.push(Accumulator::new(site));
            groups.len() - 1
        });
        groups[slot].add(site, key);
    }

    let mut divergent = 0_usize;
    let communes: Vec<CommuneAggregate> = groups
        .into_iter()
        .map(|group| {
            if group.divergent {
                divergent += 1;
                log::debug!(
                    "Commune '{}' ({}) has conflicting name, code or population values; keeping the first",
                    group.aggregate.commune_name,
                    group.aggregate.commune_code
                );
            }
            group.finish()
        })
        .collect();

    if divergent > 0 {
        log::warn!("{divergent} communes have conflicting attributes across rows (grouped by {key})");
    }
    log::debug!(
        "Aggregated {} sites into {} communes by {key}",
        sites.len(),
        communes.len()
    );

    CommuneTable { key, communes }
}
