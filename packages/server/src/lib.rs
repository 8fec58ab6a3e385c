#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the culture map dashboard.
//!
//! Serves the filtered site table, per-commune aggregates, the density
//! heatmap and breakdowns as JSON, plus the static frontend from
//! `app/dist`. All workers share one [`Dashboard`], which loads the source
//! file once and memoizes each filter selection.

mod handlers;
pub mod interactive;

use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use culture_map_chat::ChatAssistant;
use culture_map_pipeline::{ConfigError, Dashboard, DashboardConfig};
use culture_map_source::SourceError;
use culture_map_source::progress::ProgressCallback;
use thiserror::Error;

/// Errors that stop the server from starting.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The source file could not be loaded.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Binding or running the HTTP server failed.
    #[error("HTTP server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared application state.
pub struct AppState {
    /// Loaded dataset and memoized pipeline results.
    pub dashboard: Arc<Dashboard>,
    /// Sidebar chat assistant.
    pub chat: ChatAssistant,
}

impl AppState {
    /// Creates the state and loads the source file, so a bad file fails
    /// at startup instead of on the first request.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the source file cannot be loaded.
    pub fn load(
        config: DashboardConfig,
        chat: ChatAssistant,
        progress: &Arc<dyn ProgressCallback>,
    ) -> Result<Self, SourceError> {
        let dashboard = Dashboard::new(config);
        let dataset = dashboard.load(progress)?;
        log::info!(
            "Serving {} located sites from {} (schema '{}')",
            dataset.located.len(),
            dataset.source.path.display(),
            dataset.source.schema_id
        );
        Ok(Self {
            dashboard: Arc::new(dashboard),
            chat,
        })
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/map", web::get().to(handlers::map_config))
            .route("/filters", web::get().to(handlers::filters))
            .route("/sites", web::get().to(handlers::sites))
            .route("/communes", web::get().to(handlers::communes))
            .route(
                "/communes/{name}/profile",
                web::get().to(handlers::commune_profile),
            )
            .route("/density", web::get().to(handlers::density))
            .route("/breakdown", web::get().to(handlers::breakdown))
            .route("/chat", web::post().to(handlers::chat)),
    );
}

/// Starts the culture map API server on the configured address.
///
/// This is a regular async function; the caller provides the runtime (e.g.
/// via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns [`ServerError`] if the HTTP server fails to bind or encounters a
/// runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(state: AppState) -> Result<(), ServerError> {
    let bind_addr = state.dashboard.config().bind_addr.clone();
    let port = state.dashboard.config().port;
    let state = web::Data::new(state);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
            // Serve frontend static files (production)
            .service(Files::new("/", "app/dist").index_file("index.html"))
    })
    .bind((bind_addr, port))?
    .run()
    .await?;

    Ok(())
}
