use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_database::is_conflict;
use shared_models::account::Identity;

pub const DOCTORS_TABLE: &str = "doctors";
pub const SPECIALTIES_TABLE: &str = "specialties";
pub const REVIEWS_TABLE: &str = "reviews";

pub const DEFAULT_DOCTOR_DESCRIPTION: &str = "this is my public profile";

// ==============================================================================
// STORE RECORDS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Doctor {
    #[serde(flatten)]
    pub identity: Identity,
    pub specialty: Uuid,
    pub description: String,
    #[serde(default)]
    pub appointments: Vec<Uuid>,
    #[serde(default)]
    pub reviews: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Doctor {
    pub fn id(&self) -> Uuid {
        self.identity.id
    }

    pub fn full_name(&self) -> String {
        self.identity.display_name()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specialty {
    pub id: Uuid,
    pub name: String,
}

/// Lowercase and trim a specialty name.
pub fn normalize_specialty_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Review {
    pub id: Uuid,
    pub author: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A doctor with the specialty reference resolved. `specialty` is `None`
/// when the referenced specialty has been deleted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorProfile {
    #[serde(flatten)]
    pub identity: Identity,
    pub specialty: Option<Specialty>,
    pub description: String,
    pub appointments: Vec<Uuid>,
    pub reviews: Vec<Uuid>,
}

impl DoctorProfile {
    pub fn new(doctor: Doctor, specialty: Option<Specialty>) -> Self {
        Self {
            identity: doctor.identity,
            specialty,
            description: doctor.description,
            appointments: doctor.appointments,
            reviews: doctor.reviews,
        }
    }
}

// ==============================================================================
// REQUESTS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct AddReviewRequest {
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpecialtyRequest {
    pub name: Option<String>,
}

// ==============================================================================
// SEARCH FILTERS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoctorField {
    Id,
    Email,
    FirstName,
    LastName,
    Description,
    Specialty,
}

impl DoctorField {
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "id" | "_id" => Some(DoctorField::Id),
            "email" => Some(DoctorField::Email),
            "firstName" | "first_name" => Some(DoctorField::FirstName),
            "lastName" | "last_name" => Some(DoctorField::LastName),
            "description" => Some(DoctorField::Description),
            "specialty" => Some(DoctorField::Specialty),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            DoctorField::Id => "id",
            DoctorField::Email => "email",
            DoctorField::FirstName => "first_name",
            DoctorField::LastName => "last_name",
            DoctorField::Description => "description",
            DoctorField::Specialty => "specialty",
        }
    }
}

/// Exact-match filters over doctor records, parsed from query parameters.
#[derive(Debug, Clone, Default)]
pub struct DoctorSearchFilters {
    pub fields: Vec<(DoctorField, String)>,
}

impl DoctorSearchFilters {
    pub fn from_query(params: &HashMap<String, String>) -> Result<Self, DoctorError> {
        let mut fields = params
            .iter()
            .map(|(key, value)| {
                DoctorField::parse(key)
                    .map(|field| (field, value.clone()))
                    .ok_or_else(|| DoctorError::ValidationError(format!("Unknown search field: {}", key)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        // HashMap iteration order is unspecified; keep the store query stable.
        fields.sort_by_key(|(field, _)| field.column());

        Ok(Self { fields })
    }
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Specialty not found")]
    SpecialtyNotFound,

    #[error("Review not found")]
    ReviewNotFound,

    #[error("Doctor with email {email} already exists")]
    EmailAlreadyExists { email: String },

    #[error("Specialty {name} already exists")]
    SpecialtyAlreadyExists { name: String },

    #[error("Unauthorized: {0}")]
    UnauthorizedAccess(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for DoctorError {
    fn from(e: anyhow::Error) -> Self {
        DoctorError::DatabaseError(e.to_string())
    }
}

impl DoctorError {
    /// Doctor write that lost a race on the unique email index.
    pub fn from_email_write(e: anyhow::Error, email: &str) -> Self {
        if is_conflict(&e) {
            DoctorError::EmailAlreadyExists {
                email: email.to_string(),
            }
        } else {
            e.into()
        }
    }

    /// Specialty write that lost a race on the unique name index.
    pub fn from_name_write(e: anyhow::Error, name: &str) -> Self {
        if is_conflict(&e) {
            DoctorError::SpecialtyAlreadyExists {
                name: name.to_string(),
            }
        } else {
            e.into()
        }
    }
}
