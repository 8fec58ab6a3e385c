#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Standalone culture map API server.
//!
//! Reads its configuration from the environment (`CULTURE_MAP_DATA`,
//! `BIND_ADDR`, `PORT`, ...). The `culture_map` CLI offers the same server
//! behind `culture_map serve`.

use culture_map_chat::ChatAssistant;
use culture_map_pipeline::DashboardConfig;
use culture_map_server::{AppState, ServerError, run_server};
use culture_map_source::progress::null_progress;

#[actix_web::main]
async fn main() -> Result<(), ServerError> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = DashboardConfig::from_env()?;
    let state = AppState::load(config, ChatAssistant::from_env(), &null_progress())?;

    run_server(state).await
}
