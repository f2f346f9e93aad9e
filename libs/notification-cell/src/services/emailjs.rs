use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::error::NotificationError;
use crate::models::EmailJsPayload;

/// EmailJS REST client.
/// Based on: https://www.emailjs.com/docs/rest-api/send/
#[derive(Clone, Debug)]
pub struct EmailJsClient {
    client: Client,
    base_url: String,
    service_id: String,
    user_id: String,
    access_token: String,
}

impl EmailJsClient {
    pub fn new(config: &AppConfig) -> Result<Self, NotificationError> {
        if !config.is_email_configured() {
            return Err(NotificationError::NotConfigured);
        }

        Ok(Self {
            client: Client::new(),
            base_url: config.emailjs_base_url.trim_end_matches('/').to_string(),
            service_id: config.emailjs_service_id.clone(),
            user_id: config.emailjs_user_id.clone(),
            access_token: config.emailjs_access_token.clone(),
        })
    }

    /// POST /email/send
    pub async fn send(&self, template_id: &str, template_params: Value) -> Result<(), NotificationError> {
        let url = format!("{}/email/send", self.base_url);

        let payload = EmailJsPayload {
            service_id: self.service_id.clone(),
            template_id: template_id.to_string(),
            user_id: self.user_id.clone(),
            access_token: self.access_token.clone(),
            template_params,
        };

        debug!("Sending email with template {} to: {}", template_id, url);

        let response = self.client.post(&url).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("EmailJS send failed: {} - {}", status, body);
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!("Email sent with template {}", template_id);
        Ok(())
    }
}
