#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for the culture map toolchain.
//!
//! Provides an `indicatif` progress bar behind the source loader's
//! [`ProgressCallback`] trait, plus [`init_logger`], which installs
//! `pretty_env_logger` behind `indicatif-log-bridge` so log lines and
//! progress bars do not overwrite each other.

use std::sync::Arc;
use std::time::Duration;

use culture_map_source::progress::ProgressCallback;
use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

/// Progress of a source load, drawn as an `indicatif` [`ProgressBar`].
pub struct IndicatifProgress {
    bar: ProgressBar,
    /// Row-count style, used once the loader has counted the data lines.
    rows_style: ProgressStyle,
}

impl IndicatifProgress {
    /// Creates the bar shown while a source CSV is read and normalized.
    ///
    /// A spinner covers decoding and header detection. When the loader
    /// reports the number of data lines the bar switches to a row counter,
    /// and it ends with the loader's "N sites loaded" summary.
    #[must_use]
    pub fn rows_bar(multi: &MultiProgress, message: &str) -> Arc<dyn ProgressCallback> {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(120));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg} ({elapsed})")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());

        let rows_style = ProgressStyle::with_template(
            "  {msg} [{bar:40.green/dim}] {human_pos}/{human_len} rows ({per_sec})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");

        Arc::new(Self { bar, rows_style })
    }
}

impl ProgressCallback for IndicatifProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
        self.bar.set_style(self.rows_style.clone());
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.bar.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }
}

/// Initializes the global logger for the `culture_map` binary.
///
/// Load reports (defaulted types, skipped rows, dropped coordinates) are
/// logged at `info`, so that is the level when `RUST_LOG` is unset.
/// `RUST_LOG` directives override it. Log lines are suspended while the
/// row bar redraws.
///
/// Returns the [`MultiProgress`] that all progress bars must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok(); // already set in tests

    log::set_max_level(level);

    multi
}
