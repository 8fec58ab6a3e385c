#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dashboard pipeline for the culture map.
//!
//! Ties the source loader and the analytics stages together behind a
//! [`Dashboard`] that the server shares across workers: the source file is
//! loaded once and reloaded when it changes, and each filter selection is
//! computed once and memoized. Also writes the prepared CSV files.

pub mod cache;
pub mod config;
pub mod dashboard;
pub mod export;

pub use config::{ConfigError, DashboardConfig};
pub use dashboard::{Dashboard, Dataset, PipelineOutput, run_pipeline};
pub use export::{ExportError, PreparedFiles, write_prepared};
