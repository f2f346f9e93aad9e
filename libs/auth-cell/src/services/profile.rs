use std::collections::HashMap;

use futures::TryFutureExt;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use appointment_cell::{Appointment, SchedulingService};
use doctor_cell::{DoctorProfile, DoctorService, Review, ReviewService, SpecialtyService};
use patient_cell::PatientService;
use shared_config::AppConfig;
use shared_models::account::Identity;

use crate::models::AuthError;

/// Builds the populated account views: every stored reference list is
/// replaced by the referenced records. References to records that no longer
/// exist are dropped; a populated participant that no longer exists is `null`.
pub struct ProfileService {
    doctors: DoctorService,
    patients: PatientService,
    specialties: SpecialtyService,
    reviews: ReviewService,
    appointments: SchedulingService,
}

impl ProfileService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            doctors: DoctorService::new(config),
            patients: PatientService::new(config),
            specialties: SpecialtyService::new(config),
            reviews: ReviewService::new(config),
            appointments: SchedulingService::new(config),
        }
    }

    pub async fn doctor_detail(&self, doctor_id: Uuid) -> Result<Value, AuthError> {
        let doctor = self.doctors.get_doctor(doctor_id).await?;
        debug!(
            "Populating doctor {} ({} appointments, {} reviews)",
            doctor_id,
            doctor.appointments.len(),
            doctor.reviews.len()
        );

        let (specialty, appointments, reviews) = futures::try_join!(
            self.specialties
                .get_specialty(doctor.specialty)
                .map_err(AuthError::from),
            self.appointments
                .get_appointments(&doctor.appointments)
                .map_err(AuthError::from),
            self.reviews
                .get_reviews(&doctor.reviews)
                .map_err(AuthError::from),
        )?;

        let mut patient_ids: Vec<Uuid> = appointments
            .iter()
            .map(|a| a.patient)
            .chain(reviews.iter().map(|r| r.author))
            .collect();
        patient_ids.sort();
        patient_ids.dedup();

        let patients: HashMap<Uuid, Identity> = self
            .patients
            .get_patients(&patient_ids)
            .await?
            .into_iter()
            .map(|p| (p.id(), p.identity))
            .collect();

        let appointment_order = doctor.appointments.clone();
        let review_order = doctor.reviews.clone();

        let mut body = json!(DoctorProfile::new(doctor, specialty));
        body["appointments"] =
            populate_appointments(&appointment_order, appointments, "patient", |a| a.patient, &patients);
        body["reviews"] = populate_reviews(&review_order, reviews, &patients);

        Ok(body)
    }

    pub async fn patient_detail(&self, patient_id: Uuid) -> Result<Value, AuthError> {
        let patient = self.patients.get_patient(patient_id).await?;
        debug!("Populating patient {} ({} appointments)", patient_id, patient.appointments.len());

        let appointments = self.appointments.get_appointments(&patient.appointments).await?;

        let mut doctor_ids: Vec<Uuid> = appointments.iter().map(|a| a.doctor).collect();
        doctor_ids.sort();
        doctor_ids.dedup();

        let doctors: HashMap<Uuid, Identity> = self
            .doctors
            .get_doctors(&doctor_ids)
            .await?
            .into_iter()
            .map(|d| (d.id(), d.identity))
            .collect();

        let mut body = json!(patient.identity);
        body["appointments"] =
            populate_appointments(&patient.appointments, appointments, "doctor", |a| a.doctor, &doctors);

        Ok(body)
    }
}

/// Appointments in stored order with one participant reference resolved.
fn populate_appointments(
    order: &[Uuid],
    appointments: Vec<Appointment>,
    field: &str,
    participant: impl Fn(&Appointment) -> Uuid,
    identities: &HashMap<Uuid, Identity>,
) -> Value {
    let by_id: HashMap<Uuid, Appointment> = appointments.into_iter().map(|a| (a.id, a)).collect();

    let populated: Vec<Value> = order
        .iter()
        .filter_map(|id| by_id.get(id))
        .map(|appointment| {
            let mut value = json!(appointment);
            value[field] = json!(identities.get(&participant(appointment)));
            value
        })
        .collect();

    Value::Array(populated)
}

fn populate_reviews(order: &[Uuid], reviews: Vec<Review>, authors: &HashMap<Uuid, Identity>) -> Value {
    let by_id: HashMap<Uuid, Review> = reviews.into_iter().map(|r| (r.id, r)).collect();

    let populated: Vec<Value> = order
        .iter()
        .filter_map(|id| by_id.get(id))
        .map(|review| {
            let mut value = json!(review);
            value["author"] = json!(authors.get(&review.author));
            value
        })
        .collect();

    Value::Array(populated)
}
