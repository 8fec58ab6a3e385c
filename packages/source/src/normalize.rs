//! Field normalization: raw CSV rows to [`SiteRecord`]s.
//!
//! A [`ColumnMap`] resolves a schema's candidate column names against the
//! actual header row once, then normalizes each data row by index. This is
//! the only place that knows about source-specific column names.

use std::collections::BTreeMap;

use csv::StringRecord;
use culture_map_culture_models::SiteCategory;
use culture_map_source_models::{SiteRecord, SourceSchema};

use crate::parsing::{parse_count, parse_decimal, parse_population};
use crate::type_mapping::lookup_category;

/// A required schema field with no matching header column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingField {
    /// Canonical field name (e.g. `"latitude"`).
    pub field: &'static str,
    /// Column names the schema looked for.
    pub candidates: Vec<String>,
}

/// Header indices for each canonical field, in candidate order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    commune_name: Vec<usize>,
    commune_code: Vec<usize>,
    infrastructure_type: Vec<usize>,
    infrastructure_name: Vec<usize>,
    coordinates: Vec<(usize, usize)>,
    population: Vec<usize>,
    count: Vec<usize>,
}

/// Counters collected while normalizing a source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    /// Data rows read from the source.
    pub rows_read: u64,
    /// Rows the CSV reader could not decode.
    pub malformed_rows: u64,
    /// Rows skipped because the commune name was empty.
    pub skipped_missing_commune: u64,
    /// Rows normalized with a missing or unparseable coordinate.
    pub missing_coordinates: u64,
    /// Type labels that fell back to the default category, with row counts.
    pub unrecognized_types: BTreeMap<String, u64>,
}

impl NormalizeReport {
    /// Total rows that were classified by the fallback rule.
    #[must_use]
    pub fn defaulted_rows(&self) -> u64 {
        self.unrecognized_types.values().sum()
    }
}

/// Cleans a header cell: trims whitespace and a leading UTF-8 BOM.
fn clean_header(raw: &str) -> &str {
    raw.trim().trim_start_matches('\u{feff}').trim()
}

fn position(headers: &[&str], name: &str) -> Option<usize> {
    headers.iter().position(|h| *h == name)
}

fn indices(headers: &[&str], candidates: &[String]) -> Vec<usize> {
    candidates
        .iter()
        .filter_map(|name| position(headers, name))
        .collect()
}

/// Pairs latitude and longitude candidates by position and keeps the pairs
/// whose two columns are both in the header.
fn coordinate_pairs(
    headers: &[&str],
    latitude: &[String],
    longitude: &[String],
) -> Vec<(usize, usize)> {
    latitude
        .iter()
        .zip(longitude)
        .filter_map(|(lat, lng)| Some((position(headers, lat)?, position(headers, lng)?)))
        .collect()
}

/// Returns the first non-empty trimmed value among `columns`.
fn first_value<'a>(record: &'a StringRecord, columns: &[usize]) -> Option<&'a str> {
    columns
        .iter()
        .filter_map(|&i| record.get(i))
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// Returns the first value among `columns` that parses with `parse`.
fn first_parsed(
    record: &StringRecord,
    columns: &[usize],
    parse: fn(&str) -> Option<f64>,
) -> Option<f64> {
    columns
        .iter()
        .filter_map(|&i| record.get(i))
        .find_map(parse)
}

impl ColumnMap {
    /// Resolves `schema` against a header row.
    ///
    /// # Errors
    ///
    /// Returns the first required field none of whose candidate columns
    /// appear in `headers`, or `latitude` when no latitude/longitude
    /// candidate pair is complete.
    pub fn resolve(schema: &SourceSchema, headers: &StringRecord) -> Result<Self, MissingField> {
        let headers: Vec<&str> = headers.iter().map(clean_header).collect();
        let fields = &schema.fields;

        for (field, candidates) in fields.required() {
            if indices(&headers, candidates).is_empty() {
                return Err(MissingField {
                    field,
                    candidates: candidates.to_vec(),
                });
            }
        }

        let coordinates = coordinate_pairs(&headers, &fields.latitude, &fields.longitude);
        if coordinates.is_empty() {
            return Err(MissingField {
                field: "latitude",
                candidates: fields.latitude.clone(),
            });
        }

        Ok(Self {
            commune_name: indices(&headers, &fields.commune_name),
            commune_code: indices(&headers, &fields.commune_code),
            infrastructure_type: indices(&headers, &fields.infrastructure_type),
            infrastructure_name: indices(&headers, &fields.infrastructure_name),
            coordinates,
            population: indices(&headers, &fields.population),
            count: indices(&headers, &fields.count),
        })
    }

    /// Normalizes one data row, updating `report`.
    ///
    /// Returns `None` only when the commune name is empty. Bad coordinates
    /// and populations become `None` fields rather than skipped rows.
    pub fn normalize(
        &self,
        record: &StringRecord,
        report: &mut NormalizeReport,
    ) -> Option<SiteRecord> {
        report.rows_read += 1;

        let Some(commune_name) = first_value(record, &self.commune_name) else {
            report.skipped_missing_commune += 1;
            log::debug!(
                "Skipping row {} with no commune name",
                record
                    .position()
                    .map_or(report.rows_read, csv::Position::line)
            );
            return None;
        };

        let commune_code = first_value(record, &self.commune_code).unwrap_or_default();
        let infrastructure_type =
            first_value(record, &self.infrastructure_type).unwrap_or_default();
        let infrastructure_name =
            first_value(record, &self.infrastructure_name).unwrap_or(infrastructure_type);

        // Both coordinates come from the same candidate pair.
        let (latitude, longitude) = self
            .coordinates
            .iter()
            .find_map(|&(lat_idx, lng_idx)| {
                let lat = record.get(lat_idx).and_then(parse_decimal)?;
                let lng = record.get(lng_idx).and_then(parse_decimal)?;
                Some((lat, lng))
            })
            .map_or((None, None), |(lat, lng)| (Some(lat), Some(lng)));
        if latitude.is_none() {
            report.missing_coordinates += 1;
        }

        let population = first_parsed(record, &self.population, parse_population);
        let count = self
            .count
            .iter()
            .filter_map(|&i| record.get(i))
            .find_map(parse_count)
            .unwrap_or(1);

        let category = lookup_category(infrastructure_type).unwrap_or_else(|| {
            *report
                .unrecognized_types
                .entry(infrastructure_type.to_string())
                .or_insert(0) += 1;
            SiteCategory::default()
        });

        Some(SiteRecord {
            commune_name: commune_name.to_string(),
            commune_code: commune_code.to_string(),
            infrastructure_type: infrastructure_type.to_string(),
            infrastructure_name: infrastructure_name.to_string(),
            latitude,
            longitude,
            category,
            population,
            count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::schema_by_id;

    fn record(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    fn equipements_map() -> ColumnMap {
        let schema = schema_by_id("equipements_communes").unwrap();
        let headers = record(&[
            "\u{feff}Nom_commune",
            "Code_insee",
            "Type",
            "Nom_equipement",
            "Population_totale",
            "Commune_latitude",
            "Commune_longitude",
            "Equipement_latitude",
            "Equipement_longitude",
        ]);
        ColumnMap::resolve(&schema, &headers).unwrap()
    }

    #[test]
    fn normalizes_decimal_comma_row() {
        let map = equipements_map();
        let mut report = NormalizeReport::default();
        let site = map
            .normalize(
                &record(&[
                    " Paris ",
                    "75056",
                    "Musée",
                    "Musée du Louvre",
                    "2165423",
                    "48,8566",
                    "2,3522",
                    "48,8606",
                    "2,3376",
                ]),
                &mut report,
            )
            .unwrap();

        assert_eq!(site.commune_name, "Paris");
        assert_eq!(site.commune_code, "75056");
        assert_eq!(site.infrastructure_name, "Musée du Louvre");
        assert_eq!(site.category, SiteCategory::Heritage);
        assert!((site.latitude.unwrap() - 48.8606).abs() < f64::EPSILON);
        assert!((site.longitude.unwrap() - 2.3376).abs() < f64::EPSILON);
        assert!((site.population.unwrap() - 2_165_423.0).abs() < f64::EPSILON);
        assert_eq!(report.rows_read, 1);
        assert_eq!(report.missing_coordinates, 0);
    }

    #[test]
    fn falls_back_to_commune_centroid_pair() {
        let map = equipements_map();
        let mut report = NormalizeReport::default();
        let site = map
            .normalize(
                &record(&[
                    "Lyon", "69123", "Théâtre", "", "", "45,76", "4,83", "n/a", "4,84",
                ]),
                &mut report,
            )
            .unwrap();

        assert!((site.latitude.unwrap() - 45.76).abs() < f64::EPSILON);
        assert!((site.longitude.unwrap() - 4.83).abs() < f64::EPSILON);
        assert_eq!(site.infrastructure_name, "Théâtre");
        assert_eq!(site.category, SiteCategory::LivePerformance);
        assert!(site.population.is_none());
    }

    #[test]
    fn garbage_coordinates_become_missing() {
        let map = equipements_map();
        let mut report = NormalizeReport::default();
        let site = map
            .normalize(
                &record(&["Nice", "06088", "Monument", "", "", "", "", "abc", "7,26"]),
                &mut report,
            )
            .unwrap();

        assert!(site.coordinates().is_none());
        assert_eq!(report.missing_coordinates, 1);
    }

    #[test]
    fn preserves_case_of_strings() {
        let map = equipements_map();
        let mut report = NormalizeReport::default();
        let site = map
            .normalize(
                &record(&[
                    "SAINT-DENIS",
                    "93066",
                    "Scène",
                    "  la Belle Scène ",
                    "",
                    "",
                    "",
                    "48,93",
                    "2,35",
                ]),
                &mut report,
            )
            .unwrap();

        assert_eq!(site.commune_name, "SAINT-DENIS");
        assert_eq!(site.infrastructure_name, "la Belle Scène");
    }

    #[test]
    fn skips_rows_without_commune() {
        let map = equipements_map();
        let mut report = NormalizeReport::default();
        let site = map.normalize(
            &record(&["  ", "75056", "Musée", "", "", "", "", "48,8", "2,3"]),
            &mut report,
        );

        assert!(site.is_none());
        assert_eq!(report.skipped_missing_commune, 1);
    }

    #[test]
    fn counts_unrecognized_types() {
        let map = equipements_map();
        let mut report = NormalizeReport::default();
        for _ in 0..2 {
            map.normalize(
                &record(&["Nantes", "44109", "Fontaine", "", "", "", "", "47,2", "-1,55"]),
                &mut report,
            );
        }

        assert_eq!(report.unrecognized_types.get("Fontaine"), Some(&2));
        assert_eq!(report.defaulted_rows(), 2);
    }

    #[test]
    fn never_mixes_coordinate_pairs() {
        let schema = schema_by_id("equipements_communes").unwrap();
        let headers = record(&[
            "Nom_commune",
            "Code_insee",
            "Type",
            "Commune_latitude",
            "Commune_longitude",
            "Equipement_longitude",
        ]);
        let map = ColumnMap::resolve(&schema, &headers).unwrap();
        let mut report = NormalizeReport::default();

        let site = map
            .normalize(
                &record(&["Lyon", "69123", "Musée", "45,76", "4,83", "2,35"]),
                &mut report,
            )
            .unwrap();

        assert_eq!(site.coordinates(), Some((45.76, 4.83)));
    }

    #[test]
    fn resolve_requires_a_complete_coordinate_pair() {
        let schema = schema_by_id("equipements_communes").unwrap();
        let headers = record(&[
            "Nom_commune",
            "Code_insee",
            "Type",
            "Equipement_latitude",
            "Commune_longitude",
        ]);

        let err = ColumnMap::resolve(&schema, &headers).unwrap_err();

        assert_eq!(err.field, "latitude");
    }

    #[test]
    fn reads_row_counts() {
        let schema = schema_by_id("heatmap_culture").unwrap();
        let headers = record(&[
            "Commune",
            "code_insee",
            "Type_equipement",
            "Nombre_categorie",
            "latitude",
            "longitude",
        ]);
        let map = ColumnMap::resolve(&schema, &headers).unwrap();
        let mut report = NormalizeReport::default();

        let counted = map
            .normalize(
                &record(&["Lyon", "69123", "Cinéma", "4", "45.76", "4.83"]),
                &mut report,
            )
            .unwrap();
        let blank = map
            .normalize(
                &record(&["Lyon", "69123", "Musée", "", "45.76", "4.83"]),
                &mut report,
            )
            .unwrap();

        assert_eq!(counted.count, 4);
        assert_eq!(blank.count, 1);
    }

    #[test]
    fn resolve_reports_missing_field() {
        let schema = schema_by_id("cultural_data").unwrap();
        let headers = record(&["nom_commune", "code_postal", "type_infrastructure", "lat"]);
        let err = ColumnMap::resolve(&schema, &headers).unwrap_err();

        assert_eq!(err.field, "latitude");
        assert_eq!(err.candidates, vec!["latitude".to_string()]);
    }
}
