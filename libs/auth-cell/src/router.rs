use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn auth_routes(state: Arc<AppConfig>) -> Router {
    let public_routes = Router::new()
        .route("/signup", post(handlers::signup))
        .route("/login", post(handlers::login))
        .route("/doctors/{doctor_id}", get(handlers::get_doctor));

    let protected_routes = Router::new()
        .route("/verify", get(handlers::verify))
        .route("/users/{account_id}/edit", put(handlers::update_profile))
        .route("/patients/{patient_id}", get(handlers::get_patient))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
