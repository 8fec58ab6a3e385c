//! Loads a delimited source file into normalized [`SiteRecord`]s.
//!
//! The file is read once into memory, the schema is either given or
//! detected from the header row, and every data row goes through the
//! [`ColumnMap`] normalizer. Undecodable rows are skipped and counted;
//! only an unreadable file or a schema mismatch fails the load.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use csv::{ByteRecord, ReaderBuilder, StringRecord};
use culture_map_source_models::{SiteRecord, SourceSchema};

use crate::SourceError;
use crate::normalize::{ColumnMap, NormalizeReport};
use crate::progress::ProgressCallback;
use crate::registry::{all_schemas, delimiter_byte, schema_by_id};

/// Rows between progress updates.
const PROGRESS_STEP: u64 = 1_000;

/// A fully normalized source file.
#[derive(Debug, Clone)]
pub struct LoadedSource {
    /// File the sites were read from.
    pub path: PathBuf,
    /// Id of the schema used to read it.
    pub schema_id: String,
    /// Normalized sites in file order.
    pub sites: Vec<SiteRecord>,
    /// Normalization counters.
    pub report: NormalizeReport,
}

fn reader(contents: &[u8], delimiter: u8) -> csv::Reader<&[u8]> {
    ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(contents)
}

fn read_headers(contents: &[u8], delimiter: u8) -> Result<StringRecord, SourceError> {
    let headers = reader(contents, delimiter).byte_headers()?.clone();
    Ok(StringRecord::from_byte_record_lossy(headers))
}

/// Resolves a named schema against the file's header row.
fn resolve_named(
    path: &Path,
    contents: &[u8],
    schema_id: &str,
) -> Result<(SourceSchema, ColumnMap), SourceError> {
    let schema = schema_by_id(schema_id)?;
    let headers = read_headers(contents, delimiter_byte(&schema)?)?;
    let columns =
        ColumnMap::resolve(&schema, &headers).map_err(|missing| SourceError::MissingColumn {
            path: path.to_path_buf(),
            schema: schema.id.clone(),
            field: missing.field,
            candidates: missing.candidates.join(", "),
        })?;
    Ok((schema, columns))
}

/// Picks the first built-in schema whose required columns are all present
/// in the header row of `contents`.
///
/// # Errors
///
/// Returns [`SourceError::UnrecognizedHeaders`] if no built-in schema
/// matches.
pub fn detect_schema(
    path: &Path,
    contents: &[u8],
) -> Result<(SourceSchema, ColumnMap), SourceError> {
    for schema in all_schemas() {
        let headers = read_headers(contents, delimiter_byte(&schema)?)?;
        match ColumnMap::resolve(&schema, &headers) {
            Ok(columns) => {
                log::info!("Detected schema '{}' for {}", schema.id, path.display());
                return Ok((schema, columns));
            }
            Err(missing) => log::debug!(
                "Schema '{}' does not match {}: no column for {}",
                schema.id,
                path.display(),
                missing.field
            ),
        }
    }

    let header = contents
        .split(|b| *b == b'\n')
        .next()
        .map(|line| String::from_utf8_lossy(line).trim().to_string())
        .unwrap_or_default();
    Err(SourceError::UnrecognizedHeaders {
        path: path.to_path_buf(),
        header,
    })
}

/// Logs a one-line summary of data-quality issues found while loading.
fn log_report(path: &Path, report: &NormalizeReport) {
    if report.malformed_rows > 0 {
        log::warn!(
            "{}: skipped {} undecodable rows",
            path.display(),
            report.malformed_rows
        );
    }
    if report.skipped_missing_commune > 0 {
        log::warn!(
            "{}: skipped {} rows with no commune name",
            path.display(),
            report.skipped_missing_commune
        );
    }
    if report.missing_coordinates > 0 {
        log::info!(
            "{}: {} rows have missing or invalid coordinates",
            path.display(),
            report.missing_coordinates
        );
    }
    if !report.unrecognized_types.is_empty() {
        let sample: Vec<&str> = report
            .unrecognized_types
            .keys()
            .take(5)
            .map(String::as_str)
            .collect();
        log::warn!(
            "{}: {} rows with {} unrecognized types classified as heritage (e.g. {})",
            path.display(),
            report.defaulted_rows(),
            report.unrecognized_types.len(),
            sample.join(", ")
        );
    }
}

/// Loads and normalizes a source file.
///
/// When `schema_id` is `None` the schema is detected from the header row.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be read, is empty, the schema
/// is unknown, or the header row lacks a column the schema requires.
pub fn load_sites(
    path: &Path,
    schema_id: Option<&str>,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<LoadedSource, SourceError> {
    let contents = std::fs::read(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if contents.iter().all(u8::is_ascii_whitespace) {
        return Err(SourceError::Empty {
            path: path.to_path_buf(),
        });
    }

    let (schema, columns) = match schema_id {
        Some(id) => resolve_named(path, &contents, id)?,
        None => detect_schema(path, &contents)?,
    };

    let line_count = contents.iter().filter(|b| **b == b'\n').count() as u64;
    progress.set_message(format!("Reading {}", path.display()));
    progress.set_total(line_count.saturating_sub(1));

    let mut csv = reader(&contents, delimiter_byte(&schema)?);
    let mut report = NormalizeReport::default();
    let mut sites = Vec::new();
    let mut record = ByteRecord::new();

    loop {
        match csv.read_byte_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                report.malformed_rows += 1;
                log::debug!("{}: skipping undecodable row: {e}", path.display());
                continue;
            }
        }

        let row = StringRecord::from_byte_record_lossy(record.clone());
        if let Some(site) = columns.normalize(&row, &mut report) {
            sites.push(site);
        }
        if report.rows_read % PROGRESS_STEP == 0 {
            progress.inc(PROGRESS_STEP);
        }
    }

    log_report(path, &report);
    log::info!(
        "Loaded {} sites from {} ({} rows, schema '{}')",
        sites.len(),
        path.display(),
        report.rows_read,
        schema.id
    );
    progress.finish(format!("{} sites loaded", sites.len()));

    Ok(LoadedSource {
        path: path.to_path_buf(),
        schema_id: schema.id,
        sites,
        report,
    })
}
