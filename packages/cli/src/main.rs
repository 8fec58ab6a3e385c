#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the culture map toolchain.
//!
//! `culture_map serve` starts the dashboard API, `prepare` writes the
//! derived `cultural_data.csv` and `heatmap_data.csv`, `summary` prints the
//! densest communes, and `schemas` lists the built-in source formats. With
//! no subcommand an interactive menu asks what to run.
//!
//! Uses `indicatif-log-bridge` (via [`culture_map_cli_utils::init_logger`])
//! so log lines and the loading progress bar share the terminal.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use culture_map_analytics_models::GroupKeyPolicy;
use culture_map_pipeline::DashboardConfig;
use dialoguer::Select;

#[derive(Parser)]
#[command(name = "culture_map", about = "Cultural infrastructure density toolchain")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Flags shared by every command that reads a source file. Unset flags
/// fall back to the `CULTURE_MAP_*` environment variables.
#[derive(clap::Args)]
struct SourceArgs {
    /// Source file to read
    #[arg(long)]
    data: Option<PathBuf>,
    /// Source schema id (detected from the header row when omitted)
    #[arg(long)]
    schema: Option<String>,
    /// Commune grouping key: auto, code or name
    #[arg(long)]
    group_key: Option<String>,
    /// Upper bound of the density color scale
    #[arg(long)]
    density_ceiling: Option<f64>,
}

impl SourceArgs {
    fn apply(self, config: &mut DashboardConfig) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(data) = self.data {
            config.data_path = data;
        }
        if self.schema.is_some() {
            config.schema_id = self.schema;
        }
        if let Some(group_key) = self.group_key {
            config.group_key = group_key
                .parse::<GroupKeyPolicy>()
                .map_err(|_| format!("invalid --group-key '{group_key}': expected auto, code or name"))?;
        }
        if let Some(ceiling) = self.density_ceiling {
            config.density_ceiling = culture_map_pipeline::config::validate_ceiling(ceiling)?;
        }
        Ok(())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start the dashboard API server
    Serve {
        #[command(flatten)]
        source: SourceArgs,
        /// Address to bind
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },
    /// Write `cultural_data.csv` and `heatmap_data.csv`
    Prepare {
        #[command(flatten)]
        source: SourceArgs,
        /// Directory to write the prepared files to
        #[arg(long, default_value = "data")]
        output_dir: PathBuf,
    },
    /// Print dataset statistics and the densest communes
    Summary {
        #[command(flatten)]
        source: SourceArgs,
        /// Number of communes to list
        #[arg(long, default_value = "10")]
        top: usize,
    },
    /// List the built-in source schemas
    Schemas,
}

/// Top-level tool selection for the interactive menu.
enum Tool {
    Serve,
    Prepare,
    Summary,
    Schemas,
}

impl Tool {
    const ALL: &[Self] = &[Self::Serve, Self::Prepare, Self::Summary, Self::Schemas];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Serve => "Start server",
            Self::Prepare => "Prepare CSV files",
            Self::Summary => "Show density summary",
            Self::Schemas => "List source schemas",
        }
    }
}

fn serve(
    config: DashboardConfig,
    multi: &culture_map_cli_utils::MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let progress = culture_map_cli_utils::IndicatifProgress::rows_bar(multi, "Loading sites");
    let state = culture_map_server::AppState::load(
        config,
        culture_map_chat::ChatAssistant::from_env(),
        &progress,
    )?;
    actix_web::rt::System::new().block_on(culture_map_server::run_server(state))?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = culture_map_cli_utils::init_logger();
    let cli = Cli::parse();
    let mut config = DashboardConfig::from_env()?;

    let Some(command) = cli.command else {
        return interactive(config, &multi);
    };

    match command {
        Commands::Serve { source, bind, port } => {
            source.apply(&mut config)?;
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            if let Some(port) = port {
                config.port = port;
            }
            serve(config, &multi)?;
        }
        Commands::Prepare { source, output_dir } => {
            source.apply(&mut config)?;
            commands::prepare(&config, &output_dir, &multi)?;
        }
        Commands::Summary { source, top } => {
            source.apply(&mut config)?;
            commands::summary(&config, top, &multi)?;
        }
        Commands::Schemas => commands::schemas(),
    }

    Ok(())
}

fn interactive(
    config: DashboardConfig,
    multi: &culture_map_cli_utils::MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Culture Map Toolchain");
    println!();

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Tool::ALL[idx] {
        Tool::Serve => {
            let progress =
                culture_map_cli_utils::IndicatifProgress::rows_bar(multi, "Loading sites");
            actix_web::rt::System::new()
                .block_on(culture_map_server::interactive::run(config, &progress))?;
        }
        Tool::Prepare => commands::prepare_interactive(config, multi)?,
        Tool::Summary => commands::summary(&config, 10, multi)?,
        Tool::Schemas => commands::schemas(),
    }

    Ok(())
}
