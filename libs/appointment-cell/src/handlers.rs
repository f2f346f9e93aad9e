use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::TokenClaims;
use shared_models::error::AppError;
use shared_utils::extractor::{ValidJson, ValidPath};

use crate::models::{AppointmentError, CreateAppointmentRequest};
use crate::services::SchedulingService;

impl From<AppointmentError> for AppError {
    fn from(e: AppointmentError) -> Self {
        match e {
            AppointmentError::NotFound
            | AppointmentError::DoctorNotFound
            | AppointmentError::PatientNotFound => AppError::NotFound(e.to_string()),
            AppointmentError::ValidationError(msg) => AppError::ValidationError(msg),
            AppointmentError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

#[axum::debug_handler]
pub async fn schedule_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(claims): Extension<TokenClaims>,
    ValidPath(doctor_id): ValidPath<Uuid>,
    ValidJson(request): ValidJson<CreateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let new = request.validate()?;
    debug!("{} {} is booking doctor {}", claims.role, claims.id, doctor_id);

    let scheduling_service = SchedulingService::new(&state);
    let appointment = scheduling_service.create_appointment(doctor_id, new).await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    ValidPath(appointment_id): ValidPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    let scheduling_service = SchedulingService::new(&state);
    let appointment = scheduling_service.get_appointment(appointment_id).await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<Arc<AppConfig>>,
    ValidPath(appointment_id): ValidPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    let scheduling_service = SchedulingService::new(&state);
    let appointment = scheduling_service.delete_appointment(appointment_id).await?;

    Ok(Json(json!({
        "message": "Appointment deleted",
        "id": appointment.id
    })))
}
