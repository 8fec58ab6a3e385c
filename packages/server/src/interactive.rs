//! Interactive mode for the server.
//!
//! Prompts for the source file, bind address and port before starting.

use std::path::PathBuf;
use std::sync::Arc;

use culture_map_chat::ChatAssistant;
use culture_map_pipeline::DashboardConfig;
use culture_map_source::progress::ProgressCallback;
use dialoguer::{Confirm, Input};

use crate::{AppState, ServerError};

/// Runs the server in interactive mode, prompting for configuration.
///
/// `defaults` pre-fills the prompts; the answers override it.
///
/// # Errors
///
/// Returns [`ServerError`] if the source file cannot be loaded or the
/// server fails to start.
#[allow(clippy::future_not_send)]
pub async fn run(
    defaults: DashboardConfig,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<(), ServerError> {
    println!("Culture Map Server");
    println!();

    let data_path: String = Input::new()
        .with_prompt("Source file")
        .default(defaults.data_path.display().to_string())
        .interact_text()
        .unwrap_or_else(|_| defaults.data_path.display().to_string());

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(defaults.bind_addr.clone())
        .interact_text()
        .unwrap_or_else(|_| defaults.bind_addr.clone());

    let port: u16 = Input::new()
        .with_prompt("Port")
        .default(defaults.port)
        .interact_text()
        .unwrap_or(defaults.port);

    if !Confirm::new()
        .with_prompt(format!("Serve {data_path} on {bind_addr}:{port}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    let config = DashboardConfig {
        data_path: PathBuf::from(data_path),
        bind_addr,
        port,
        ..defaults
    };
    let state = AppState::load(config, ChatAssistant::from_env(), progress)?;

    super::run_server(state).await
}
