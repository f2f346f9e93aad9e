use std::collections::HashMap;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{eq, SupabaseClient};
use shared_models::account::{normalize_email, NewIdentity, ProfileUpdate, DEFAULT_PROFILE_PICTURE};

use crate::models::{
    Doctor, DoctorError, DoctorField, DoctorProfile, DoctorSearchFilters, Specialty,
    DEFAULT_DOCTOR_DESCRIPTION, DOCTORS_TABLE,
};
use crate::services::specialty::SpecialtyService;

pub struct DoctorService {
    supabase: SupabaseClient,
    specialties: SpecialtyService,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            specialties: SpecialtyService::new(config),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Doctor>, DoctorError> {
        let email = normalize_email(email);
        debug!("Looking up doctor by email: {}", email);

        let rows: Vec<Doctor> = self
            .supabase
            .select(DOCTORS_TABLE, &[eq("email", &email)])
            .await?;

        Ok(rows.into_iter().next())
    }

    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor: {}", doctor_id);

        self.supabase
            .select_by_id(DOCTORS_TABLE, doctor_id)
            .await?
            .ok_or(DoctorError::NotFound)
    }

    pub async fn get_doctors(&self, ids: &[Uuid]) -> Result<Vec<Doctor>, DoctorError> {
        Ok(self.supabase.select_by_ids(DOCTORS_TABLE, ids).await?)
    }

    /// Doctor with its specialty reference resolved.
    pub async fn get_profile(&self, doctor_id: Uuid) -> Result<DoctorProfile, DoctorError> {
        let doctor = self.get_doctor(doctor_id).await?;
        let specialty = self.specialties.get_specialty(doctor.specialty).await?;

        Ok(DoctorProfile::new(doctor, specialty))
    }

    pub async fn create_doctor(&self, new: NewIdentity, specialty_id: Uuid) -> Result<Doctor, DoctorError> {
        let email = normalize_email(&new.email);
        debug!("Creating doctor account for: {}", email);

        if self.find_by_email(&email).await?.is_some() {
            return Err(DoctorError::EmailAlreadyExists { email });
        }

        if self.specialties.get_specialty(specialty_id).await?.is_none() {
            return Err(DoctorError::SpecialtyNotFound);
        }

        let now = Utc::now().to_rfc3339();
        let row = json!({
            "id": Uuid::new_v4(),
            "email": email,
            "password": new.password_hash,
            "first_name": new.first_name.trim().to_lowercase(),
            "last_name": new.last_name.trim().to_lowercase(),
            "specialty": specialty_id,
            "profile_picture": DEFAULT_PROFILE_PICTURE,
            "description": DEFAULT_DOCTOR_DESCRIPTION,
            "appointments": [],
            "reviews": [],
            "created_at": now,
            "updated_at": now
        });

        let doctor: Doctor = self
            .supabase
            .insert(DOCTORS_TABLE, row)
            .await
            .map_err(|e| DoctorError::from_email_write(e, &email))?;
        info!("Doctor account created with ID: {}", doctor.id());

        Ok(doctor)
    }

    pub async fn update_profile(
        &self,
        doctor_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Doctor, DoctorError> {
        debug!("Updating doctor profile: {}", doctor_id);

        let new_email = update.email.as_deref().map(normalize_email).unwrap_or_default();
        let mut update_data = serde_json::Map::new();

        if let Some(first_name) = &update.first_name {
            update_data.insert("first_name".to_string(), json!(first_name.trim().to_lowercase()));
        }
        if let Some(last_name) = &update.last_name {
            update_data.insert("last_name".to_string(), json!(last_name.trim().to_lowercase()));
        }
        if let Some(profile_picture) = &update.profile_picture {
            update_data.insert("profile_picture".to_string(), json!(profile_picture));
        }
        if let Some(description) = &update.description {
            update_data.insert("description".to_string(), json!(description));
        }
        if let Some(email) = &update.email {
            let email = normalize_email(email);
            if email.is_empty() {
                return Err(DoctorError::ValidationError("Email cannot be empty".to_string()));
            }
            if let Some(existing) = self.find_by_email(&email).await? {
                if existing.id() != doctor_id {
                    return Err(DoctorError::EmailAlreadyExists { email });
                }
            }
            update_data.insert("email".to_string(), json!(email));
        }

        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        self.supabase
            .update_by_id(DOCTORS_TABLE, doctor_id, Value::Object(update_data))
            .await
            .map_err(|e| DoctorError::from_email_write(e, &new_email))?
            .ok_or(DoctorError::NotFound)
    }

    /// Exact-match search. A `specialty` filter may name the specialty instead
    /// of giving its id; an unknown name matches nothing.
    pub async fn search_doctors(&self, filters: DoctorSearchFilters) -> Result<Vec<DoctorProfile>, DoctorError> {
        debug!("Searching doctors with {} filter(s)", filters.fields.len());

        let mut query = Vec::with_capacity(filters.fields.len());

        for (field, value) in &filters.fields {
            let value = match field {
                DoctorField::Id => Uuid::parse_str(value.trim())
                    .map_err(|_| DoctorError::ValidationError(format!("Invalid doctor id: {}", value)))?
                    .to_string(),
                DoctorField::Email => normalize_email(value),
                DoctorField::FirstName | DoctorField::LastName => value.trim().to_lowercase(),
                DoctorField::Description => value.clone(),
                DoctorField::Specialty => match Uuid::parse_str(value.trim()) {
                    Ok(id) => id.to_string(),
                    Err(_) => match self.specialties.find_by_name(value).await? {
                        Some(specialty) => specialty.id.to_string(),
                        None => {
                            debug!("No specialty named {}, search is empty", value);
                            return Ok(Vec::new());
                        }
                    },
                },
            };
            query.push(eq(field.column(), &value));
        }

        let doctors: Vec<Doctor> = self.supabase.select(DOCTORS_TABLE, &query).await?;
        self.resolve_specialties(doctors).await
    }

    async fn resolve_specialties(&self, doctors: Vec<Doctor>) -> Result<Vec<DoctorProfile>, DoctorError> {
        let mut ids: Vec<Uuid> = doctors.iter().map(|d| d.specialty).collect();
        ids.sort();
        ids.dedup();

        let specialties: HashMap<Uuid, Specialty> = self
            .specialties
            .get_specialties(&ids)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        Ok(doctors
            .into_iter()
            .map(|doctor| {
                let specialty = specialties.get(&doctor.specialty).cloned();
                DoctorProfile::new(doctor, specialty)
            })
            .collect())
    }
}
