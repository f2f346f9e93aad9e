use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::account::ProfileUpdate;
use shared_models::auth::{TokenClaims, TokenResponse};
use shared_models::error::AppError;
use shared_utils::extractor::{ValidJson, ValidPath};

use crate::models::{CreatedUser, LoginRequest, SignUpRequest, SignUpResponse};
use crate::services::{AuthService, ProfileService};

#[axum::debug_handler]
pub async fn signup(
    State(state): State<Arc<AppConfig>>,
    ValidJson(request): ValidJson<SignUpRequest>,
) -> Result<(StatusCode, Json<SignUpResponse>), AppError> {
    let auth_service = AuthService::new(&state);
    let account = auth_service.signup(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            user: CreatedUser::from(&account),
        }),
    ))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<AppConfig>>,
    ValidJson(request): ValidJson<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Login attempt as {}", request.role());

    let auth_service = AuthService::new(&state);
    let auth_token = auth_service.login(request).await?;

    Ok(Json(TokenResponse { auth_token }))
}

/// Echoes the decoded token payload.
pub async fn verify(Extension(claims): Extension<TokenClaims>) -> Json<TokenClaims> {
    Json(claims)
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<Arc<AppConfig>>,
    Extension(claims): Extension<TokenClaims>,
    ValidPath(account_id): ValidPath<Uuid>,
    ValidJson(update): ValidJson<ProfileUpdate>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let auth_service = AuthService::new(&state);
    let (account, auth_token) = auth_service.update_profile(&claims, account_id, &update).await?;

    let mut body = json!(account);
    body["authToken"] = json!(auth_token);

    Ok((StatusCode::CREATED, Json(body)))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<AppConfig>>,
    ValidPath(doctor_id): ValidPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    let profile_service = ProfileService::new(&state);
    let doctor = profile_service.doctor_detail(doctor_id).await?;

    Ok(Json(doctor))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<Arc<AppConfig>>,
    ValidPath(patient_id): ValidPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    let profile_service = ProfileService::new(&state);
    let patient = profile_service.patient_detail(patient_id).await?;

    Ok(Json(patient))
}
