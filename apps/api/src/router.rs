use std::sync::Arc;

use axum::{routing::get, Json, Router};

use appointment_cell::router::appointment_routes;
use auth_cell::router::auth_routes;
use doctor_cell::router::{search_routes, specialty_routes};
use notification_cell::router::notification_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    let api_routes = Router::new()
        .route("/", get(|| async { Json("All good in here") }))
        .merge(appointment_routes(state.clone()))
        .merge(notification_routes(state.clone()))
        .nest("/search", search_routes(state.clone()))
        .nest("/specialties", specialty_routes(state.clone()));

    Router::new()
        .route("/", get(|| async { "Medbook API is running!" }))
        .nest("/auth", auth_routes(state))
        .nest("/api", api_routes)
}
