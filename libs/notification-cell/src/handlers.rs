use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_utils::extractor::ValidJson;

use crate::models::FeedbackRequest;
use crate::services::EmailJsClient;

#[axum::debug_handler]
pub async fn send_feedback(
    State(state): State<Arc<AppConfig>>,
    ValidJson(request): ValidJson<FeedbackRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let client = EmailJsClient::new(&state)?;

    client
        .send(&state.emailjs_feedback_template_id, request.template_params())
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "message": "Feedback sent" }))))
}
