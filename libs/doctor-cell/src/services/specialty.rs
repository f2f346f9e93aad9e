use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{eq, SupabaseClient};

use crate::models::{normalize_specialty_name, DoctorError, Specialty, SPECIALTIES_TABLE};

pub struct SpecialtyService {
    supabase: SupabaseClient,
}

impl SpecialtyService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn list_specialties(&self) -> Result<Vec<Specialty>, DoctorError> {
        Ok(self
            .supabase
            .select(SPECIALTIES_TABLE, &["order=name.asc".to_string()])
            .await?)
    }

    pub async fn get_specialty(&self, specialty_id: Uuid) -> Result<Option<Specialty>, DoctorError> {
        Ok(self.supabase.select_by_id(SPECIALTIES_TABLE, specialty_id).await?)
    }

    pub async fn get_specialties(&self, ids: &[Uuid]) -> Result<Vec<Specialty>, DoctorError> {
        Ok(self.supabase.select_by_ids(SPECIALTIES_TABLE, ids).await?)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Specialty>, DoctorError> {
        let name = normalize_specialty_name(name);
        let rows: Vec<Specialty> = self
            .supabase
            .select(SPECIALTIES_TABLE, &[eq("name", &name)])
            .await?;

        Ok(rows.into_iter().next())
    }

    pub async fn create_specialty(&self, name: &str) -> Result<Specialty, DoctorError> {
        let name = Self::validated_name(name)?;
        debug!("Creating specialty: {}", name);

        if self.find_by_name(&name).await?.is_some() {
            return Err(DoctorError::SpecialtyAlreadyExists { name });
        }

        let specialty: Specialty = self
            .supabase
            .insert(SPECIALTIES_TABLE, json!({ "id": Uuid::new_v4(), "name": name }))
            .await
            .map_err(|e| DoctorError::from_name_write(e, &name))?;

        info!("Specialty {} created with ID: {}", specialty.name, specialty.id);
        Ok(specialty)
    }

    pub async fn update_specialty(&self, specialty_id: Uuid, name: &str) -> Result<Specialty, DoctorError> {
        let name = Self::validated_name(name)?;
        debug!("Renaming specialty {} to {}", specialty_id, name);

        if let Some(existing) = self.find_by_name(&name).await? {
            if existing.id != specialty_id {
                return Err(DoctorError::SpecialtyAlreadyExists { name });
            }
        }

        self.supabase
            .update_by_id(SPECIALTIES_TABLE, specialty_id, json!({ "name": name }))
            .await
            .map_err(|e| DoctorError::from_name_write(e, &name))?
            .ok_or(DoctorError::SpecialtyNotFound)
    }

    /// Deletes the specialty without checking whether doctors still reference it.
    pub async fn delete_specialty(&self, specialty_id: Uuid) -> Result<Specialty, DoctorError> {
        debug!("Deleting specialty: {}", specialty_id);

        self.supabase
            .delete_by_id(SPECIALTIES_TABLE, specialty_id)
            .await?
            .ok_or(DoctorError::SpecialtyNotFound)
    }

    fn validated_name(name: &str) -> Result<String, DoctorError> {
        let name = normalize_specialty_name(name);
        if name.is_empty() {
            return Err(DoctorError::ValidationError("Provide a specialty name".to_string()));
        }
        Ok(name)
    }
}
