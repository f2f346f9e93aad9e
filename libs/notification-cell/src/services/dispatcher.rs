use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use shared_config::AppConfig;

use crate::models::AppointmentNotice;
use crate::services::emailjs::EmailJsClient;

/// Sends appointment notices on detached tasks.
pub struct NotificationDispatcher {
    client: Option<EmailJsClient>,
    appointment_template_id: String,
}

impl NotificationDispatcher {
    pub fn new(config: &AppConfig) -> Self {
        let client = EmailJsClient::new(config).ok();

        Self {
            client,
            appointment_template_id: config.emailjs_appointment_template_id.clone(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Spawns the send and returns immediately. Failures are logged only.
    /// Returns `None` when no email gateway is configured.
    pub fn notify_appointment(&self, notice: AppointmentNotice) -> Option<JoinHandle<()>> {
        let Some(client) = self.client.clone() else {
            debug!("Email gateway not configured, skipping appointment notice");
            return None;
        };

        let template_id = self.appointment_template_id.clone();

        Some(tokio::spawn(async move {
            match client.send(&template_id, notice.template_params()).await {
                Ok(()) => info!(
                    "Appointment notice sent for {} with {}",
                    notice.patient_name, notice.doctor_name
                ),
                Err(e) => warn!("Appointment notice failed: {}", e),
            }
        }))
    }
}
