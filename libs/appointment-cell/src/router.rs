use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

/// Routes mounted under `/api`. Every appointment operation requires a token.
pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/appointments/{appointment_id}", get(handlers::get_appointment))
        .route(
            "/appointments/{appointment_id}/delete",
            get(handlers::delete_appointment),
        )
        .route("/schedule/doctors/{doctor_id}", post(handlers::schedule_appointment))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
