use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

/// Routes mounted under `/api/search`.
pub fn search_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new()
        .route("/doctors", get(handlers::search_doctors))
        .route("/reviews/{review_id}", get(handlers::get_review));

    let protected_routes = Router::new()
        .route("/doctors/{doctor_id}/review", post(handlers::add_review))
        .route(
            "/doctors/{doctor_id}/review/{review_id}/delete",
            get(handlers::delete_review),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

/// Routes mounted under `/api/specialties`. Deletion is a GET, as the
/// existing clients expect.
pub fn specialty_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::list_specialties).post(handlers::create_specialty),
        )
        .route(
            "/{specialty_id}",
            get(handlers::delete_specialty).post(handlers::update_specialty),
        )
        .with_state(state)
}
