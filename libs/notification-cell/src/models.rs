use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Body of `POST {base}/email/send`.
#[derive(Debug, Clone, Serialize)]
pub struct EmailJsPayload {
    pub service_id: String,
    pub template_id: String,
    pub user_id: String,
    #[serde(rename = "accessToken")]
    pub access_token: String,
    pub template_params: Value,
}

/// Data for the "new appointment" email.
#[derive(Debug, Clone)]
pub struct AppointmentNotice {
    pub doctor_name: String,
    pub patient_name: String,
    pub summary: String,
}

impl AppointmentNotice {
    pub fn template_params(&self) -> Value {
        json!({
            "doctor_name": self.doctor_name,
            "patient_name": self.patient_name,
            "message": self.summary,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackRequest {
    #[serde(default)]
    pub from_name: String,
    #[serde(default)]
    pub message: String,
}

impl FeedbackRequest {
    pub fn template_params(&self) -> Value {
        json!({
            "from_name": self.from_name,
            "message": self.message,
        })
    }
}
