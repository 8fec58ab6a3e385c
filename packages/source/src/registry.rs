//! Schema registry: the built-in source schemas, embedded at compile time.
//!
//! Each `.toml` file in `packages/source/schemas/` describes one export
//! format. Adding a format means adding a TOML file and listing it here.

use culture_map_source_models::SourceSchema;

use crate::SourceError;

/// TOML schemas embedded at compile time. Order matters for detection: the
/// first schema whose required columns are all present wins.
const SCHEMA_TOMLS: &[(&str, &str)] = &[
    ("cultural_data", include_str!("../schemas/cultural_data.toml")),
    (
        "equipements_communes",
        include_str!("../schemas/equipements_communes.toml"),
    ),
    (
        "heatmap_culture",
        include_str!("../schemas/heatmap_culture.toml"),
    ),
];

#[cfg(test)]
const EXPECTED_SCHEMA_COUNT: usize = 3;

/// Parses a [`SourceSchema`] from a TOML string.
///
/// # Errors
///
/// Returns [`SourceError::Toml`] if the TOML is malformed or missing
/// required fields.
pub fn parse_schema_toml(toml_str: &str) -> Result<SourceSchema, SourceError> {
    Ok(toml::de::from_str(toml_str)?)
}

/// Returns all built-in source schemas, in detection order.
///
/// # Panics
///
/// Panics if an embedded TOML is malformed. They are compile-time
/// constants, so this is caught by the registry tests.
#[must_use]
pub fn all_schemas() -> Vec<SourceSchema> {
    SCHEMA_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_schema_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Looks up a built-in schema by id.
///
/// # Errors
///
/// Returns [`SourceError::UnknownSchema`] if no schema has this id.
pub fn schema_by_id(id: &str) -> Result<SourceSchema, SourceError> {
    all_schemas()
        .into_iter()
        .find(|s| s.id == id)
        .ok_or_else(|| SourceError::UnknownSchema { id: id.to_string() })
}

/// Returns the delimiter of `schema` as a single byte.
///
/// # Errors
///
/// Returns [`SourceError::InvalidSchema`] unless the delimiter is exactly
/// one ASCII character.
pub fn delimiter_byte(schema: &SourceSchema) -> Result<u8, SourceError> {
    match schema.delimiter.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(SourceError::InvalidSchema {
            id: schema.id.clone(),
            message: format!(
                "delimiter must be a single ASCII character, got {:?}",
                schema.delimiter
            ),
        }),
    }
}
