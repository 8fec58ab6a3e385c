//! Writes the prepared per-site and heatmap files.
//!
//! `cultural_data.csv` is readable again through the `cultural_data`
//! schema, so a prepared file can be served directly.

use std::path::{Path, PathBuf};

use culture_map_analytics_models::{DensityPoint, SiteWithDensity};
use thiserror::Error;

/// Per-site output file name.
pub const CULTURAL_DATA_FILE: &str = "cultural_data.csv";

/// Heatmap output file name.
pub const HEATMAP_DATA_FILE: &str = "heatmap_data.csv";

const CULTURAL_DATA_HEADER: [&str; 10] = [
    "nom_commune",
    "code_postal",
    "type_infrastructure",
    "nom_infrastructure",
    "latitude",
    "longitude",
    "population",
    "nombre",
    "categorie",
    "cultural_density",
];

const HEATMAP_HEADER: [&str; 3] = ["latitude", "longitude", "cultural_density"];

/// Errors raised while writing prepared files.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The output directory could not be created.
    #[error("failed to create {}: {source}", .path.display())]
    Io {
        /// Directory that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Writing a CSV file failed.
    #[error("failed to write {}: {source}", .path.display())]
    Csv {
        /// File that failed.
        path: PathBuf,
        /// Underlying CSV error.
        source: csv::Error,
    },
}

/// Paths of the files written by [`write_prepared`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedFiles {
    /// Per-site file.
    pub cultural_data: PathBuf,
    /// Heatmap file.
    pub heatmap_data: PathBuf,
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn write_rows<I>(path: &Path, header: &[&str], rows: I) -> Result<(), ExportError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let wrap = |source| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(wrap)?;
    writer.write_record(header).map_err(wrap)?;
    for row in rows {
        writer.write_record(&row).map_err(wrap)?;
    }
    writer.flush().map_err(|e| wrap(e.into()))?;
    Ok(())
}

/// Writes `cultural_data.csv` and `heatmap_data.csv` into `dir`.
///
/// Missing populations and densities are written as empty cells.
///
/// # Errors
///
/// Returns [`ExportError`] if `dir` cannot be created or a file cannot be
/// written.
pub fn write_prepared(
    dir: &Path,
    sites: &[SiteWithDensity],
    density: &[DensityPoint],
) -> Result<PreparedFiles, ExportError> {
    std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let files = PreparedFiles {
        cultural_data: dir.join(CULTURAL_DATA_FILE),
        heatmap_data: dir.join(HEATMAP_DATA_FILE),
    };

    write_rows(
        &files.cultural_data,
        &CULTURAL_DATA_HEADER,
        sites.iter().map(|row| {
            let site = &row.site;
            vec![
                site.commune_name.clone(),
                site.commune_code.clone(),
                site.infrastructure_type.clone(),
                site.infrastructure_name.clone(),
                cell(site.latitude),
                cell(site.longitude),
                cell(site.population),
                site.count.to_string(),
                site.category.french_label().to_string(),
                cell(row.commune_density_per_1000),
            ]
        }),
    )?;

    write_rows(
        &files.heatmap_data,
        &HEATMAP_HEADER,
        density.iter().map(|point| {
            vec![
                point.latitude.to_string(),
                point.longitude.to_string(),
                point.density_per_1000.to_string(),
            ]
        }),
    )?;

    log::info!(
        "Wrote {} sites to {} and {} communes to {}",
        sites.len(),
        files.cultural_data.display(),
        density.len(),
        files.heatmap_data.display()
    );

    Ok(files)
}

#[cfg(test)]
mod tests {
    use culture_map_analytics_models::SiteFilter;
    use culture_map_source::load_sites;
    use culture_map_source::progress::null_progress;
    use culture_map_source_models::SiteRecord;

    use super::*;
    use crate::config::DashboardConfig;
    use crate::dashboard::run_pipeline;

    fn site(commune: &str, ty: &str, population: Option<f64>) -> SiteRecord {
        SiteRecord {
            commune_name: commune.to_string(),
            commune_code: "75001".to_string(),
            infrastructure_type: ty.to_string(),
            infrastructure_name: format!("{ty}, {commune}"),
            latitude: Some(48.85),
            longitude: Some(2.35),
            category: culture_map_source::type_mapping::classify(ty),
            population,
            count: 1,
        }
    }

    #[test]
    fn prepared_file_reads_back_with_cultural_data_schema() {
        let dir = std::env::temp_dir().join("culture_map_export_tests");
        let sites = vec![
            site("Paris", "Musée", Some(2_000_000.0)),
            site("Paris", "Théâtre", Some(2_000_000.0)),
        ];
        let output = run_pipeline(&sites, &SiteFilter::default(), &DashboardConfig::default());

        let files = write_prepared(&dir, &output.sites, &output.density).unwrap();
        let loaded = load_sites(&files.cultural_data, Some("cultural_data"), &null_progress())
            .unwrap();

        assert_eq!(loaded.sites, sites);
        let text = std::fs::read_to_string(&files.cultural_data).unwrap();
        assert!(text.starts_with("nom_commune,code_postal,"));
        assert!(text.contains("spectacle_vivant,0.001"));
    }

    #[test]
    fn missing_values_are_empty_cells() {
        let dir = std::env::temp_dir().join("culture_map_export_empty_tests");
        let sites = vec![site("Lyon", "Musée", None)];
        let output = run_pipeline(&sites, &SiteFilter::default(), &DashboardConfig::default());

        let files = write_prepared(&dir, &output.sites, &output.density).unwrap();

        let cultural = std::fs::read_to_string(&files.cultural_data).unwrap();
        assert!(cultural.lines().nth(1).unwrap().ends_with(",,1,patrimoine,"));
        let heatmap = std::fs::read_to_string(&files.heatmap_data).unwrap();
        assert_eq!(heatmap.trim(), "latitude,longitude,cultural_density");
    }
}
