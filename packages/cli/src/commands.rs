//! Batch commands: prepare, summary and schemas.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use culture_map_analytics::rank_by_density;
use culture_map_analytics_models::SiteFilter;
use culture_map_cli_utils::{IndicatifProgress, MultiProgress};
use culture_map_pipeline::export::CULTURAL_DATA_FILE;
use culture_map_pipeline::{Dashboard, DashboardConfig, Dataset, run_pipeline, write_prepared};
use culture_map_source::registry::all_schemas;
use dialoguer::{Confirm, Input};

/// Loads the configured source with a progress bar.
fn load(
    config: &DashboardConfig,
    multi: &MultiProgress,
) -> Result<(Dashboard, Arc<Dataset>), Box<dyn std::error::Error>> {
    let progress = IndicatifProgress::rows_bar(multi, "Loading sites");
    let dashboard = Dashboard::new(config.clone());
    let dataset = dashboard.load(&progress)?;
    Ok((dashboard, dataset))
}

/// Writes the prepared files for the whole dataset into `output_dir`.
pub fn prepare(
    config: &DashboardConfig,
    output_dir: &Path,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let (_, dataset) = load(config, multi)?;

    let output = run_pipeline(&dataset.located, &SiteFilter::default(), config);
    let files = write_prepared(output_dir, &output.sites, &output.density)?;

    println!(
        "Prepared {} sites and {} density points in {:.1}s",
        output.sites.len(),
        output.density.len(),
        start.elapsed().as_secs_f64()
    );
    println!("  {}", files.cultural_data.display());
    println!("  {}", files.heatmap_data.display());
    Ok(())
}

/// Prompts for the input file and output directory, then runs [`prepare`].
pub fn prepare_interactive(
    mut config: DashboardConfig,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let data_path: String = Input::new()
        .with_prompt("Source file")
        .default(config.data_path.display().to_string())
        .interact_text()?;
    let output_dir: String = Input::new()
        .with_prompt("Output directory")
        .default("data".to_string())
        .interact_text()?;

    config.data_path = PathBuf::from(data_path);
    let output_dir = PathBuf::from(output_dir);

    if config.data_path.parent() == Some(output_dir.as_path())
        && config.data_path.file_name().and_then(|n| n.to_str())
            == Some(CULTURAL_DATA_FILE)
        && !Confirm::new()
            .with_prompt("This overwrites the source file. Continue?")
            .default(false)
            .interact()?
    {
        println!("Cancelled.");
        return Ok(());
    }

    prepare(&config, &output_dir, multi)
}

/// Prints load statistics and the `top` densest communes.
pub fn summary(
    config: &DashboardConfig,
    top: usize,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let (dashboard, dataset) = load(config, multi)?;
    let output = dashboard.run(&SiteFilter::default())?;
    let report = &dataset.source.report;

    println!();
    println!(
        "{} (schema '{}')",
        dataset.source.path.display(),
        dataset.source.schema_id
    );
    println!("  rows read:             {}", report.rows_read);
    println!("  sites:                 {}", dataset.source.sites.len());
    println!("  located sites:         {}", dataset.located.len());
    println!("  missing coordinates:   {}", dataset.coordinates.missing);
    println!("  out-of-range:          {}", dataset.coordinates.out_of_range);
    println!("  defaulted to heritage: {}", report.defaulted_rows());
    println!(
        "  communes:              {} (grouped by {})",
        output.communes.communes.len(),
        output.communes.key
    );
    println!("  with a density:        {}", output.density.len());
    println!();

    let ranked = rank_by_density(&output.communes.communes, top);
    if ranked.is_empty() {
        println!("No commune has a known population.");
        return Ok(());
    }

    println!("Densest communes (sites per 1,000 inhabitants):");
    for (i, commune) in ranked.iter().enumerate() {
        println!(
            "{:>3}. {:<30} {:>8.3}  ({} sites, population {})",
            i + 1,
            commune.commune_name,
            commune.density_per_1000.unwrap_or_default(),
            commune.total_sites,
            commune.population
        );
    }
    Ok(())
}

/// Lists the built-in source schemas.
pub fn schemas() {
    for schema in all_schemas() {
        let delimiter = match schema.delimiter.as_str() {
            "\t" => "tab".to_string(),
            other => format!("'{other}'"),
        };
        println!("{:<22} {} (delimiter {delimiter})", schema.id, schema.name);
        println!("    commune:   {}", schema.fields.commune_name.join(" | "));
        println!("    code:      {}", schema.fields.commune_code.join(" | "));
        println!("    type:      {}", schema.fields.infrastructure_type.join(" | "));
        println!("    latitude:  {}", schema.fields.latitude.join(" | "));
        println!("    longitude: {}", schema.fields.longitude.join(" | "));
    }
}
