#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Cultural infrastructure source loading and normalization.
//!
//! Each export format is described by a TOML [`SourceSchema`] in the
//! [`registry`]. The [`loader`] reads a delimited file, resolves the schema
//! against its header row and normalizes every row into a
//! [`SiteRecord`](culture_map_source_models::SiteRecord), classifying it
//! with [`type_mapping::classify`].

pub mod loader;
pub mod normalize;
pub mod parsing;
pub mod progress;
pub mod registry;
pub mod type_mapping;

use std::path::PathBuf;

pub use culture_map_source_models::SourceSchema;
pub use loader::{LoadedSource, detect_schema, load_sites};

/// Errors that can occur while loading a source file.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The source file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// File that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// CSV decoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A schema TOML could not be parsed.
    #[error("schema parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// No built-in schema has the requested id.
    #[error("unknown source schema '{id}'")]
    UnknownSchema {
        /// The requested schema id.
        id: String,
    },

    /// A schema definition is unusable.
    #[error("invalid schema '{id}': {message}")]
    InvalidSchema {
        /// Schema id.
        id: String,
        /// Description of what went wrong.
        message: String,
    },

    /// The header row lacks a column required by the schema.
    #[error(
        "{}: schema '{schema}' needs a column for '{field}' (looked for: {candidates})",
        .path.display()
    )]
    MissingColumn {
        /// Source file.
        path: PathBuf,
        /// Schema id.
        schema: String,
        /// Canonical field with no matching column.
        field: &'static str,
        /// Column names the schema looked for, comma-separated.
        candidates: String,
    },

    /// No built-in schema matches the header row.
    #[error("{}: no known source schema matches header '{header}'", .path.display())]
    UnrecognizedHeaders {
        /// Source file.
        path: PathBuf,
        /// The raw header line.
        header: String,
    },

    /// The file contains no data.
    #[error("{}: file is empty", .path.display())]
    Empty {
        /// Source file.
        path: PathBuf,
    },
}
