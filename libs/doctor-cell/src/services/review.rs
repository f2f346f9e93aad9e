use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use patient_cell::PATIENTS_TABLE;
use shared_config::AppConfig;
use shared_database::SupabaseClient;

use crate::models::{Doctor, DoctorError, Review, DOCTORS_TABLE, REVIEWS_TABLE};

pub struct ReviewService {
    supabase: SupabaseClient,
}

impl ReviewService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn get_review(&self, review_id: Uuid) -> Result<Review, DoctorError> {
        self.supabase
            .select_by_id(REVIEWS_TABLE, review_id)
            .await?
            .ok_or(DoctorError::ReviewNotFound)
    }

    pub async fn get_reviews(&self, ids: &[Uuid]) -> Result<Vec<Review>, DoctorError> {
        Ok(self.supabase.select_by_ids(REVIEWS_TABLE, ids).await?)
    }

    /// Stores a review and links it from both the doctor and its author.
    /// The two list updates are independent; a failed patient update is
    /// logged and does not undo the doctor side.
    pub async fn add_review(
        &self,
        doctor_id: Uuid,
        author_id: Uuid,
        content: &str,
    ) -> Result<Doctor, DoctorError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(DoctorError::ValidationError("Review content cannot be empty".to_string()));
        }

        let _: Doctor = self
            .supabase
            .select_by_id(DOCTORS_TABLE, doctor_id)
            .await?
            .ok_or(DoctorError::NotFound)?;

        debug!("Patient {} reviewing doctor {}", author_id, doctor_id);

        let review: Review = self
            .supabase
            .insert(
                REVIEWS_TABLE,
                json!({
                    "id": Uuid::new_v4(),
                    "author": author_id,
                    "content": content,
                    "created_at": Utc::now().to_rfc3339()
                }),
            )
            .await?;

        let doctor: Doctor = self
            .supabase
            .push_reference(DOCTORS_TABLE, doctor_id, "reviews", review.id)
            .await?
            .ok_or(DoctorError::NotFound)?;

        match self
            .supabase
            .push_reference::<Value>(PATIENTS_TABLE, author_id, "reviews", review.id)
            .await
        {
            Ok(Some(_)) => {}
            Ok(None) => warn!("Review {} author {} has no patient record", review.id, author_id),
            Err(e) => warn!("Failed to link review {} to patient {}: {}", review.id, author_id, e),
        }

        info!("Review {} added to doctor {}", review.id, doctor_id);
        Ok(doctor)
    }

    /// Unlinks a review from its doctor and author. The review record itself
    /// stays in the store. Only the author or the reviewed doctor may do this,
    /// and the review must be on `doctor_id`'s list.
    pub async fn delete_review(
        &self,
        doctor_id: Uuid,
        review_id: Uuid,
        requested_by: Uuid,
    ) -> Result<Review, DoctorError> {
        let review = self.get_review(review_id).await?;

        let doctor: Doctor = self
            .supabase
            .select_by_id(DOCTORS_TABLE, doctor_id)
            .await?
            .ok_or(DoctorError::NotFound)?;

        if !doctor.reviews.contains(&review_id) {
            debug!("Review {} is not listed on doctor {}", review_id, doctor_id);
            return Err(DoctorError::ReviewNotFound);
        }

        if requested_by != review.author && requested_by != doctor.id() {
            return Err(DoctorError::UnauthorizedAccess(
                "Only the author or the reviewed doctor can remove a review".to_string(),
            ));
        }

        debug!("Removing review {} from doctor {}", review_id, doctor_id);

        let author: Option<Value> = self
            .supabase
            .pull_reference(PATIENTS_TABLE, review.author, "reviews", review_id)
            .await?;
        if author.is_none() {
            warn!("Review {} author {} has no patient record", review_id, review.author);
        }

        let _: Doctor = self
            .supabase
            .pull_reference(DOCTORS_TABLE, doctor_id, "reviews", review_id)
            .await?
            .ok_or(DoctorError::NotFound)?;

        info!("Review {} unlinked from doctor {}", review_id, doctor_id);
        Ok(review)
    }
}
