//! HTTP handler functions for the culture map API.

use std::sync::Arc;

use actix_web::{HttpResponse, web};
use culture_map_pipeline::PipelineOutput;
use culture_map_server_models::{
    ApiChatRequest, ApiError, ApiHealth, ApiMapConfig, SiteQueryParams,
};

use crate::AppState;

/// Runs the pipeline for the query's filter, or returns the 500 response.
fn run_filtered(
    state: &AppState,
    params: &SiteQueryParams,
) -> Result<Arc<PipelineOutput>, HttpResponse> {
    let filter = params.to_filter();
    state.dashboard.run(&filter).map_err(|e| {
        log::error!("Failed to run pipeline for {filter:?}: {e}");
        HttpResponse::InternalServerError().json(ApiError::new("Failed to load cultural data"))
    })
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/map`
///
/// Returns the map viewport and category colors.
pub async fn map_config(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiMapConfig::france(
        state.dashboard.config().density_ceiling,
    ))
}

/// `GET /api/filters`
///
/// Returns the distinct communes, categories and types for the sidebar.
pub async fn filters(state: web::Data<AppState>) -> HttpResponse {
    match state.dashboard.dataset() {
        Ok(dataset) => HttpResponse::Ok().json(&dataset.options),
        Err(e) => {
            log::error!("Failed to load filter options: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to load cultural data"))
        }
    }
}

/// `GET /api/sites`
///
/// Returns the filtered sites with their commune density.
pub async fn sites(
    state: web::Data<AppState>,
    params: web::Query<SiteQueryParams>,
) -> HttpResponse {
    match run_filtered(&state, &params) {
        Ok(output) => HttpResponse::Ok().json(&output.sites),
        Err(response) => response,
    }
}

/// `GET /api/communes`
///
/// Returns per-commune aggregates for the filtered sites.
pub async fn communes(
    state: web::Data<AppState>,
    params: web::Query<SiteQueryParams>,
) -> HttpResponse {
    match run_filtered(&state, &params) {
        Ok(output) => HttpResponse::Ok().json(&output.communes),
        Err(response) => response,
    }
}

/// `GET /api/density`
///
/// Returns the color-scaled density heatmap for the filtered sites.
pub async fn density(
    state: web::Data<AppState>,
    params: web::Query<SiteQueryParams>,
) -> HttpResponse {
    match run_filtered(&state, &params) {
        Ok(output) => HttpResponse::Ok().json(&output.density),
        Err(response) => response,
    }
}

/// `GET /api/breakdown`
///
/// Returns site counts per category and type for the filtered sites.
pub async fn breakdown(
    state: web::Data<AppState>,
    params: web::Query<SiteQueryParams>,
) -> HttpResponse {
    match run_filtered(&state, &params) {
        Ok(output) => HttpResponse::Ok().json(&output.breakdown),
        Err(response) => response,
    }
}

/// `GET /api/communes/{name}/profile`
pub async fn commune_profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let name = path.into_inner();
    match state.dashboard.profile(&name) {
        Ok(Some(profile)) => HttpResponse::Ok().json(profile),
        Ok(None) => {
            HttpResponse::NotFound().json(ApiError::new(format!("Unknown commune '{name}'")))
        }
        Err(e) => {
            log::error!("Failed to build profile for '{name}': {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to load cultural data"))
        }
    }
}

/// `POST /api/chat`
pub async fn chat(
    state: web::Data<AppState>,
    body: web::Json<ApiChatRequest>,
) -> HttpResponse {
    HttpResponse::Ok().json(state.chat.respond(&body.message))
}

#[cfg(test)]
mod tests {
    use actix_web::{App, test};
    use culture_map_chat::ChatAssistant;
    use culture_map_pipeline::DashboardConfig;
    use culture_map_source::progress::null_progress;
    use serde_json::Value;

    use crate::configure;

    use super::*;

    fn state(name: &str) -> AppState {
        state_from(
            name,
            "nom_commune,code_postal,type_infrastructure,nom_infrastructure,latitude,longitude,population\n\
             Paris,75001,Museum,Louvre,48.85,2.35,2000000\n\
             Paris,75001,Theater,Odéon,48.86,2.36,2000000\n\
             Lyon,69001,Museum,Musée des Confluences,45.76,4.83,0\n",
        )
    }

    fn state_from(name: &str, contents: &str) -> AppState {
        let dir = std::env::temp_dir().join("culture_map_server_tests");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        let config = DashboardConfig {
            data_path: path,
            ..DashboardConfig::default()
        };
        AppState::load(config, ChatAssistant::new(None), &null_progress()).unwrap()
    }

    #[actix_web::test]
    async fn density_excludes_zero_population() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state("density.csv")))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/density").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        let points = body.as_array().unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0]["communeName"], "Paris");
        assert_eq!(points[0]["totalSites"], 2);
    }

    #[actix_web::test]
    async fn sites_honor_query_filters() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state("sites.csv")))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/sites?categories=spectacle_vivant")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        let sites = body.as_array().unwrap();
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0]["infrastructureName"], "Odéon");
        assert_eq!(sites[0]["category"], "live_performance");
    }

    #[actix_web::test]
    async fn type_filter_matches_labels_with_commas() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state_from(
                    "comma_types.csv",
                    "nom_commune,code_postal,type_infrastructure,nom_infrastructure,latitude,longitude,population\n\
                     Paris,75001,\"Cinéma, audiovisuel\",Le Grand Rex,48.87,2.35,2000000\n\
                     Paris,75001,Cinéma,Le Champo,48.85,2.34,2000000\n\
                     Lyon,69001,\"Livre, littérature\",Bibliothèque,45.76,4.83,500000\n",
                )))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/sites?types=Cin%C3%A9ma%2C%20audiovisuel%7CLivre%2C%20litt%C3%A9rature")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|site| site["infrastructureName"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Le Grand Rex", "Bibliothèque"]);
    }

    #[actix_web::test]
    async fn unknown_commune_profile_is_not_found() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state("profile.csv")))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/communes/Marseille/profile")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn chat_without_key_asks_for_one() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state("chat.csv")))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/chat")
            .set_json(serde_json::json!({ "message": "Où sont les musées ?" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["kind"], "missing_credential");
    }
}
