use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_database::is_conflict;
use shared_models::account::Identity;
use shared_models::error::AppError;

pub const PATIENTS_TABLE: &str = "patients";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Patient {
    #[serde(flatten)]
    pub identity: Identity,
    #[serde(default)]
    pub appointments: Vec<Uuid>,
    #[serde(default)]
    pub reviews: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    pub fn id(&self) -> Uuid {
        self.identity.id
    }

    pub fn full_name(&self) -> String {
        self.identity.display_name()
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum PatientError {
    #[error("Patient not found")]
    NotFound,

    #[error("Patient with email {email} already exists")]
    EmailAlreadyExists { email: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for PatientError {
    fn from(e: anyhow::Error) -> Self {
        PatientError::DatabaseError(e.to_string())
    }
}

impl PatientError {
    /// A write that lost a race on the unique email index is still a duplicate.
    pub fn from_write(e: anyhow::Error, email: &str) -> Self {
        if is_conflict(&e) {
            PatientError::EmailAlreadyExists {
                email: email.to_string(),
            }
        } else {
            e.into()
        }
    }
}

impl From<PatientError> for AppError {
    fn from(e: PatientError) -> Self {
        match e {
            PatientError::NotFound => AppError::NotFound(e.to_string()),
            PatientError::EmailAlreadyExists { .. } => AppError::Conflict(e.to_string()),
            PatientError::ValidationError(msg) => AppError::ValidationError(msg),
            PatientError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
