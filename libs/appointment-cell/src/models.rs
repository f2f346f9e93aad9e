use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const APPOINTMENTS_TABLE: &str = "appointments";

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct Appointment {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub gender: Gender,
    pub summary: String,
    pub scheduled_at: DateTime<Utc>,
    pub doctor: Uuid,
    pub patient: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "other" => Some(Gender::Other),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
            Gender::Other => write!(f, "other"),
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

/// Booking form as sent by clients. Every field is optional here so that a
/// missing one is reported as a validation error rather than a JSON rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub gender: Option<String>,
    pub summary: Option<String>,
    #[serde(alias = "appointment")]
    pub scheduled_at: Option<String>,
    pub patient: Option<String>,
}

/// A booking that passed validation.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub gender: Gender,
    pub summary: String,
    pub scheduled_at: DateTime<Utc>,
    pub patient: Uuid,
}

impl CreateAppointmentRequest {
    pub fn validate(&self) -> Result<NewAppointment, AppointmentError> {
        let mut missing = Vec::new();

        let mut required = |name: &'static str, value: &Option<String>| -> String {
            match value.as_deref().map(str::trim) {
                Some(v) if !v.is_empty() => v.to_string(),
                _ => {
                    missing.push(name);
                    String::new()
                }
            }
        };

        let first_name = required("firstName", &self.first_name);
        let last_name = required("lastName", &self.last_name);
        let email = required("email", &self.email);
        let phone_number = required("phoneNumber", &self.phone_number);
        let gender = required("gender", &self.gender);
        let summary = required("summary", &self.summary);
        let scheduled_at = required("scheduledAt", &self.scheduled_at);
        let patient = required("patient", &self.patient);

        if !missing.is_empty() {
            return Err(AppointmentError::ValidationError(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let gender = Gender::parse(&gender).ok_or_else(|| {
            AppointmentError::ValidationError(format!("Invalid gender: {}", gender))
        })?;

        let scheduled_at = parse_scheduled_at(&scheduled_at).ok_or_else(|| {
            AppointmentError::ValidationError(format!("Invalid appointment date: {}", scheduled_at))
        })?;

        let patient = Uuid::parse_str(&patient).map_err(|_| {
            AppointmentError::ValidationError(format!("Invalid patient id: {}", patient))
        })?;

        Ok(NewAppointment {
            first_name,
            last_name,
            email: email.to_lowercase(),
            phone_number,
            gender,
            summary,
            scheduled_at,
            patient,
        })
    }
}

/// Accepts RFC 3339 as well as the zone-less forms an HTML date/time input
/// produces; the latter are taken as UTC.
fn parse_scheduled_at(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Some(at.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Patient not found")]
    PatientNotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for AppointmentError {
    fn from(e: anyhow::Error) -> Self {
        AppointmentError::DatabaseError(e.to_string())
    }
}
