use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::{Doctor, DOCTORS_TABLE};
use notification_cell::{AppointmentNotice, NotificationDispatcher};
use patient_cell::{Patient, PATIENTS_TABLE};
use shared_config::AppConfig;
use shared_database::SupabaseClient;

use crate::models::{Appointment, AppointmentError, NewAppointment, APPOINTMENTS_TABLE};

const APPOINTMENTS_COLUMN: &str = "appointments";

pub struct SchedulingService {
    supabase: SupabaseClient,
    notifications: NotificationDispatcher,
}

impl SchedulingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            notifications: NotificationDispatcher::new(config),
        }
    }

    /// Books an appointment and links it from both participants.
    ///
    /// The three writes are not atomic. If linking fails, the appointment is
    /// unlinked from the doctor (when already linked) and deleted before the
    /// original error is returned.
    pub async fn create_appointment(
        &self,
        doctor_id: Uuid,
        new: NewAppointment,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Scheduling appointment with doctor {} for patient {}", doctor_id, new.patient);

        let now = Utc::now().to_rfc3339();
        let row = json!({
            "id": Uuid::new_v4(),
            "first_name": new.first_name,
            "last_name": new.last_name,
            "email": new.email,
            "phone_number": new.phone_number,
            "gender": new.gender,
            "summary": new.summary,
            "scheduled_at": new.scheduled_at.to_rfc3339(),
            "doctor": doctor_id,
            "patient": new.patient,
            "created_at": now,
            "updated_at": now
        });

        let appointment: Appointment = self.supabase.insert(APPOINTMENTS_TABLE, row).await?;

        let doctor: Doctor = match self
            .supabase
            .push_reference(DOCTORS_TABLE, doctor_id, APPOINTMENTS_COLUMN, appointment.id)
            .await
        {
            Ok(Some(doctor)) => doctor,
            Ok(None) => {
                self.compensate(&appointment, false).await;
                return Err(AppointmentError::DoctorNotFound);
            }
            Err(e) => {
                self.compensate(&appointment, false).await;
                return Err(e.into());
            }
        };

        let patient: Patient = match self
            .supabase
            .push_reference(PATIENTS_TABLE, appointment.patient, APPOINTMENTS_COLUMN, appointment.id)
            .await
        {
            Ok(Some(patient)) => patient,
            Ok(None) => {
                self.compensate(&appointment, true).await;
                return Err(AppointmentError::PatientNotFound);
            }
            Err(e) => {
                self.compensate(&appointment, true).await;
                return Err(e.into());
            }
        };

        info!(
            "Appointment {} scheduled with doctor {} for patient {}",
            appointment.id, doctor_id, appointment.patient
        );

        self.notifications.notify_appointment(AppointmentNotice {
            doctor_name: doctor.full_name(),
            patient_name: patient.full_name(),
            summary: appointment.summary.clone(),
        });

        Ok(appointment)
    }

    /// Best effort; failures are logged and the caller's error stands.
    async fn compensate(&self, appointment: &Appointment, doctor_linked: bool) {
        warn!("Rolling back appointment {}", appointment.id);

        if doctor_linked {
            if let Err(e) = self
                .supabase
                .pull_reference::<Value>(DOCTORS_TABLE, appointment.doctor, APPOINTMENTS_COLUMN, appointment.id)
                .await
            {
                warn!(
                    "Failed to unlink appointment {} from doctor {}: {}",
                    appointment.id, appointment.doctor, e
                );
            }
        }

        if let Err(e) = self
            .supabase
            .delete_by_id::<Value>(APPOINTMENTS_TABLE, appointment.id)
            .await
        {
            warn!("Failed to delete rolled back appointment {}: {}", appointment.id, e);
        }
    }

    pub async fn get_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        debug!("Fetching appointment: {}", appointment_id);

        self.supabase
            .select_by_id(APPOINTMENTS_TABLE, appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound)
    }

    /// Appointments for the given ids; ids with no record are skipped.
    pub async fn get_appointments(&self, ids: &[Uuid]) -> Result<Vec<Appointment>, AppointmentError> {
        Ok(self.supabase.select_by_ids(APPOINTMENTS_TABLE, ids).await?)
    }

    /// Removes the appointment record only. Participant lists keep the id.
    pub async fn delete_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        debug!("Deleting appointment: {}", appointment_id);

        let appointment: Appointment = self
            .supabase
            .delete_by_id(APPOINTMENTS_TABLE, appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound)?;

        info!("Appointment {} deleted", appointment_id);
        Ok(appointment)
    }
}
