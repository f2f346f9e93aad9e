use serde::{Deserialize, Serialize};
use uuid::Uuid;

use appointment_cell::AppointmentError;
use doctor_cell::{Doctor, DoctorError};
use patient_cell::{Patient, PatientError};
use shared_models::account::Identity;
use shared_models::auth::Role;
use shared_models::error::AppError;

// ==============================================================================
// REQUESTS
// ==============================================================================

/// Signup form. A non-empty `specialty` makes the account a doctor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub specialty: Option<String>,
}

impl SignUpRequest {
    pub fn role(&self) -> Role {
        match self.specialty.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => Role::Doctor,
            _ => Role::Patient,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "type")]
    pub account_type: Option<String>,
}

impl LoginRequest {
    /// Anything other than `"patient"`, including no type at all, logs in a doctor.
    pub fn role(&self) -> Role {
        match self.account_type.as_deref() {
            Some("patient") => Role::Patient,
            _ => Role::Doctor,
        }
    }
}

// ==============================================================================
// ACCOUNTS
// ==============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Account {
    Doctor(Doctor),
    Patient(Patient),
}

impl Account {
    pub fn identity(&self) -> &Identity {
        match self {
            Account::Doctor(doctor) => &doctor.identity,
            Account::Patient(patient) => &patient.identity,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Account::Doctor(_) => Role::Doctor,
            Account::Patient(_) => Role::Patient,
        }
    }
}

/// Public part of a freshly created account.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedUser {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
}

impl From<&Account> for CreatedUser {
    fn from(account: &Account) -> Self {
        let identity = account.identity();
        Self {
            id: identity.id,
            email: identity.email.clone(),
            first_name: identity.first_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SignUpResponse {
    pub user: CreatedUser,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    ValidationError(String),

    #[error("Doctor already exists.")]
    DoctorAlreadyExists,

    #[error("Patient already exists.")]
    PatientAlreadyExists,

    #[error("User not found.")]
    UserNotFound,

    #[error("Unable to authenticate the user")]
    InvalidCredentials,

    #[error("{0}")]
    Unauthorized(String),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("Token signing failed: {0}")]
    Token(String),

    #[error(transparent)]
    Doctor(#[from] DoctorError),

    #[error(transparent)]
    Patient(#[from] PatientError),

    #[error(transparent)]
    Appointment(#[from] AppointmentError),
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::ValidationError(msg) => AppError::ValidationError(msg),
            AuthError::DoctorAlreadyExists | AuthError::PatientAlreadyExists => {
                AppError::Conflict(e.to_string())
            }
            AuthError::UserNotFound | AuthError::InvalidCredentials => AppError::Auth(e.to_string()),
            AuthError::Unauthorized(msg) => AppError::Auth(msg),
            AuthError::PasswordHash(msg) | AuthError::Token(msg) => AppError::Internal(msg),
            AuthError::Doctor(e) => e.into(),
            AuthError::Patient(e) => e.into(),
            AuthError::Appointment(e) => e.into(),
        }
    }
}
