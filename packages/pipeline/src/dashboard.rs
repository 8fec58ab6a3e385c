//! The dashboard: one loaded dataset plus memoized filter results.

use std::sync::{Arc, Mutex, PoisonError};

use culture_map_analytics::{
    aggregate, category_type_counts, commune_profile, density_view, filter_located,
    filter_options, filter_sites, join_density,
};
use culture_map_analytics_models::{
    CategoryTypeCount, CommuneProfile, CommuneTable, CoordinateReport, DensityPoint,
    FilterOptions, SiteFilter, SiteWithDensity,
};
use culture_map_source::progress::{ProgressCallback, null_progress};
use culture_map_source::{LoadedSource, SourceError};
use culture_map_source_models::SiteRecord;

use crate::cache::{DatasetCache, Memo};
use crate::config::DashboardConfig;

/// A loaded source with the sites that can be placed on the map.
#[derive(Debug)]
pub struct Dataset {
    /// The raw load result.
    pub source: Arc<LoadedSource>,
    /// Sites that passed the coordinate filter, in file order.
    pub located: Vec<SiteRecord>,
    /// Coordinate filter counters.
    pub coordinates: CoordinateReport,
    /// Distinct values for the filter widgets.
    pub options: FilterOptions,
}

impl Dataset {
    /// Runs the coordinate filter over a loaded source.
    #[must_use]
    pub fn new(source: Arc<LoadedSource>) -> Self {
        let (located, coordinates) = filter_located(&source.sites);
        let options = filter_options(&located);
        Self {
            source,
            located,
            coordinates,
            options,
        }
    }
}

/// Every table derived for one filter selection.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Filtered sites joined with their commune density.
    pub sites: Vec<SiteWithDensity>,
    /// Per-commune aggregates and the key they were grouped by.
    pub communes: CommuneTable,
    /// Color-scaled density view.
    pub density: Vec<DensityPoint>,
    /// Category/type counts.
    pub breakdown: Vec<CategoryTypeCount>,
}

/// Runs filter, aggregation, density view and breakdown over located sites.
#[must_use]
pub fn run_pipeline(
    located: &[SiteRecord],
    filter: &SiteFilter,
    config: &DashboardConfig,
) -> PipelineOutput {
    let filtered = filter_sites(located, filter);
    let communes = aggregate(&filtered, config.group_key);
    let density = density_view(&communes.communes, config.density_ceiling);
    let sites = join_density(&filtered, &communes.communes, communes.key);
    let breakdown = category_type_counts(&filtered);

    log::debug!(
        "Pipeline: {} sites, {} communes, {} density points for {filter:?}",
        filtered.len(),
        communes.communes.len(),
        density.len()
    );

    PipelineOutput {
        sites,
        communes,
        density,
        breakdown,
    }
}

struct DashboardState {
    dataset: Option<Arc<Dataset>>,
    memo: Memo<SiteFilter, PipelineOutput>,
}

/// Shared state behind the HTTP API.
///
/// The raw file is read once and re-read only when it changes on disk;
/// results are memoized per [`SiteFilter`] and dropped on reload.
pub struct Dashboard {
    config: DashboardConfig,
    datasets: DatasetCache,
    state: Mutex<DashboardState>,
}

impl Dashboard {
    /// Creates a dashboard. Nothing is read until the first request.
    #[must_use]
    pub fn new(config: DashboardConfig) -> Self {
        let memo = Memo::new(config.cache_capacity);
        Self {
            config,
            datasets: DatasetCache::new(),
            state: Mutex::new(DashboardState {
                dataset: None,
                memo,
            }),
        }
    }

    /// The configuration this dashboard was built with.
    #[must_use]
    pub const fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Returns the current dataset, loading it with `progress` if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the source file cannot be loaded.
    pub fn load(&self, progress: &Arc<dyn ProgressCallback>) -> Result<Arc<Dataset>, SourceError> {
        let source = self.datasets.get(
            &self.config.data_path,
            self.config.schema_id.as_deref(),
            progress,
        )?;

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(dataset) = &state.dataset
            && Arc::ptr_eq(&dataset.source, &source)
        {
            return Ok(Arc::clone(dataset));
        }

        let dataset = Arc::new(Dataset::new(source));
        if !state.memo.is_empty() {
            log::info!("Dataset reloaded, dropping {} cached results", state.memo.len());
        }
        state.memo.clear();
        state.dataset = Some(Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Returns the current dataset.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the source file cannot be loaded.
    pub fn dataset(&self) -> Result<Arc<Dataset>, SourceError> {
        self.load(&null_progress())
    }

    /// Returns the pipeline output for `filter`, from the memo when possible.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the source file cannot be loaded.
    pub fn run(&self, filter: &SiteFilter) -> Result<Arc<PipelineOutput>, SourceError> {
        let dataset = self.dataset()?;
        {
            let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(hit) = state.memo.get(filter) {
                return Ok(hit);
            }
        }

        let output = run_pipeline(&dataset.located, filter, &self.config);

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let current = state
            .dataset
            .as_ref()
            .is_some_and(|d| Arc::ptr_eq(d, &dataset));
        if current {
            if let Some(hit) = state.memo.get(filter) {
                return Ok(hit);
            }
            Ok(state.memo.insert(filter.clone(), output))
        } else {
            Ok(Arc::new(output))
        }
    }

    /// Returns the breakdown for one commune over all located sites.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the source file cannot be loaded.
    pub fn profile(&self, commune: &str) -> Result<Option<CommuneProfile>, SourceError> {
        Ok(commune_profile(&self.dataset()?.located, commune))
    }
}
