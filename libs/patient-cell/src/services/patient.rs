use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{eq, SupabaseClient};
use shared_models::account::{normalize_email, NewIdentity, ProfileUpdate, DEFAULT_PROFILE_PICTURE};

use crate::models::{Patient, PatientError, PATIENTS_TABLE};

pub struct PatientService {
    supabase: SupabaseClient,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Patient>, PatientError> {
        let email = normalize_email(email);
        debug!("Looking up patient by email: {}", email);

        let rows: Vec<Patient> = self
            .supabase
            .select(PATIENTS_TABLE, &[eq("email", &email)])
            .await?;

        Ok(rows.into_iter().next())
    }

    pub async fn get_patient(&self, patient_id: Uuid) -> Result<Patient, PatientError> {
        debug!("Fetching patient: {}", patient_id);

        self.supabase
            .select_by_id(PATIENTS_TABLE, patient_id)
            .await?
            .ok_or(PatientError::NotFound)
    }

    pub async fn get_patients(&self, ids: &[Uuid]) -> Result<Vec<Patient>, PatientError> {
        Ok(self.supabase.select_by_ids(PATIENTS_TABLE, ids).await?)
    }

    pub async fn create_patient(&self, new: NewIdentity) -> Result<Patient, PatientError> {
        let email = normalize_email(&new.email);
        debug!("Creating patient account for: {}", email);

        if self.find_by_email(&email).await?.is_some() {
            return Err(PatientError::EmailAlreadyExists { email });
        }

        let now = Utc::now().to_rfc3339();
        let row = json!({
            "id": Uuid::new_v4(),
            "email": email,
            "password": new.password_hash,
            "first_name": new.first_name.trim(),
            "last_name": new.last_name.trim(),
            "profile_picture": DEFAULT_PROFILE_PICTURE,
            "appointments": [],
            "reviews": [],
            "created_at": now,
            "updated_at": now
        });

        let patient: Patient = self
            .supabase
            .insert(PATIENTS_TABLE, row)
            .await
            .map_err(|e| PatientError::from_write(e, &email))?;
        info!("Patient account created with ID: {}", patient.id());

        Ok(patient)
    }

    pub async fn update_profile(
        &self,
        patient_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Patient, PatientError> {
        debug!("Updating patient profile: {}", patient_id);

        let new_email = update.email.as_deref().map(normalize_email).unwrap_or_default();
        let mut update_data = serde_json::Map::new();

        if let Some(first_name) = &update.first_name {
            update_data.insert("first_name".to_string(), json!(first_name.trim()));
        }
        if let Some(last_name) = &update.last_name {
            update_data.insert("last_name".to_string(), json!(last_name.trim()));
        }
        if let Some(profile_picture) = &update.profile_picture {
            update_data.insert("profile_picture".to_string(), json!(profile_picture));
        }
        if let Some(email) = &update.email {
            let email = normalize_email(email);
            if email.is_empty() {
                return Err(PatientError::ValidationError("Email cannot be empty".to_string()));
            }
            if let Some(existing) = self.find_by_email(&email).await? {
                if existing.id() != patient_id {
                    return Err(PatientError::EmailAlreadyExists { email });
                }
            }
            update_data.insert("email".to_string(), json!(email));
        }

        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        self.supabase
            .update_by_id(PATIENTS_TABLE, patient_id, Value::Object(update_data))
            .await
            .map_err(|e| PatientError::from_write(e, &new_email))?
            .ok_or(PatientError::NotFound)
    }
}
