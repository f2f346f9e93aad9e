use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{Role, TokenClaims};
use shared_models::error::AppError;
use shared_utils::extractor::{ValidJson, ValidPath, ValidQuery};

use crate::models::{AddReviewRequest, DoctorError, DoctorSearchFilters, SpecialtyRequest};
use crate::services::{DoctorService, ReviewService, SpecialtyService};

impl From<DoctorError> for AppError {
    fn from(e: DoctorError) -> Self {
        match e {
            DoctorError::NotFound
            | DoctorError::SpecialtyNotFound
            | DoctorError::ReviewNotFound => AppError::NotFound(e.to_string()),
            DoctorError::EmailAlreadyExists { .. } | DoctorError::SpecialtyAlreadyExists { .. } => {
                AppError::Conflict(e.to_string())
            }
            DoctorError::UnauthorizedAccess(msg) => AppError::Auth(msg),
            DoctorError::ValidationError(msg) => AppError::ValidationError(msg),
            DoctorError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

// ==============================================================================
// DIRECTORY SEARCH
// ==============================================================================

#[axum::debug_handler]
pub async fn search_doctors(
    State(state): State<Arc<AppConfig>>,
    ValidQuery(params): ValidQuery<HashMap<String, String>>,
) -> Result<Json<Value>, AppError> {
    let filters = DoctorSearchFilters::from_query(&params)?;

    let doctor_service = DoctorService::new(&state);
    let doctors = doctor_service.search_doctors(filters).await?;

    Ok(Json(json!(doctors)))
}

// ==============================================================================
// REVIEWS
// ==============================================================================

#[axum::debug_handler]
pub async fn add_review(
    State(state): State<Arc<AppConfig>>,
    Extension(claims): Extension<TokenClaims>,
    ValidPath(doctor_id): ValidPath<Uuid>,
    ValidJson(request): ValidJson<AddReviewRequest>,
) -> Result<Json<Value>, AppError> {
    if claims.role != Role::Patient {
        return Err(AppError::Auth("Only patients can review doctors".to_string()));
    }

    let content = request.content.unwrap_or_default();

    let review_service = ReviewService::new(&state);
    let doctor = review_service.add_review(doctor_id, claims.id, &content).await?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn delete_review(
    State(state): State<Arc<AppConfig>>,
    Extension(claims): Extension<TokenClaims>,
    ValidPath((doctor_id, review_id)): ValidPath<(Uuid, Uuid)>,
) -> Result<Json<Value>, AppError> {
    let review_service = ReviewService::new(&state);
    let review = review_service.delete_review(doctor_id, review_id, claims.id).await?;

    Ok(Json(json!({
        "message": "Review removed",
        "review": review
    })))
}

#[axum::debug_handler]
pub async fn get_review(
    State(state): State<Arc<AppConfig>>,
    ValidPath(review_id): ValidPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    let review_service = ReviewService::new(&state);
    let review = review_service.get_review(review_id).await?;

    Ok(Json(json!(review)))
}

// ==============================================================================
// SPECIALTIES
// ==============================================================================

#[axum::debug_handler]
pub async fn list_specialties(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let specialty_service = SpecialtyService::new(&state);
    let specialties = specialty_service.list_specialties().await?;

    Ok(Json(json!(specialties)))
}

#[axum::debug_handler]
pub async fn create_specialty(
    State(state): State<Arc<AppConfig>>,
    ValidJson(request): ValidJson<SpecialtyRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let name = request.name.unwrap_or_default();

    let specialty_service = SpecialtyService::new(&state);
    let specialty = specialty_service.create_specialty(&name).await?;

    Ok((StatusCode::CREATED, Json(json!(specialty))))
}

#[axum::debug_handler]
pub async fn update_specialty(
    State(state): State<Arc<AppConfig>>,
    ValidPath(specialty_id): ValidPath<Uuid>,
    ValidJson(request): ValidJson<SpecialtyRequest>,
) -> Result<Json<Value>, AppError> {
    let name = request.name.unwrap_or_default();

    let specialty_service = SpecialtyService::new(&state);
    let specialty = specialty_service.update_specialty(specialty_id, &name).await?;

    Ok(Json(json!(specialty)))
}

#[axum::debug_handler]
pub async fn delete_specialty(
    State(state): State<Arc<AppConfig>>,
    ValidPath(specialty_id): ValidPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    let specialty_service = SpecialtyService::new(&state);
    let specialty = specialty_service.delete_specialty(specialty_id).await?;

    Ok(Json(json!({
        "message": "Specialty deleted",
        "specialty": specialty
    })))
}
