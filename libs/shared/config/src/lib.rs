use std::env;
use tracing::warn;

pub const DEFAULT_EMAILJS_BASE_URL: &str = "https://api.emailjs.com/api/v1.0";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub token_secret: String,
    pub emailjs_base_url: String,
    pub emailjs_service_id: String,
    pub emailjs_feedback_template_id: String,
    pub emailjs_appointment_template_id: String,
    pub emailjs_user_id: String,
    pub emailjs_access_token: String,
    pub cloudinary_name: String,
    pub cloudinary_key: String,
    pub cloudinary_secret: String,
    pub port: u16,
}

fn required(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| {
        warn!("{} not set, using empty value", name);
        String::new()
    })
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: required("SUPABASE_URL"),
            supabase_service_key: required("SUPABASE_SERVICE_KEY"),
            token_secret: required("TOKEN_SECRET"),
            emailjs_base_url: env::var("EMAILJS_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("EMAILJS_BASE_URL not set, using default");
                    DEFAULT_EMAILJS_BASE_URL.to_string()
                }),
            emailjs_service_id: required("SERVICE_ID"),
            emailjs_feedback_template_id: required("TEMPLATE_ID"),
            emailjs_appointment_template_id: required("APPOINTMENT_TEMPLATE_ID"),
            emailjs_user_id: required("USER_ID"),
            emailjs_access_token: required("ACCESS_TOKEN"),
            cloudinary_name: required("CLOUDINARY_NAME"),
            cloudinary_key: required("CLOUDINARY_KEY"),
            cloudinary_secret: required("CLOUDINARY_SECRET"),
            port: env::var("PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or_else(|| {
                    warn!("PORT not set or invalid, using {}", DEFAULT_PORT);
                    DEFAULT_PORT
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_service_key.is_empty()
            && !self.token_secret.is_empty()
    }

    pub fn is_email_configured(&self) -> bool {
        !self.emailjs_base_url.is_empty()
            && !self.emailjs_service_id.is_empty()
            && !self.emailjs_user_id.is_empty()
    }

    pub fn is_asset_upload_configured(&self) -> bool {
        !self.cloudinary_name.is_empty()
            && !self.cloudinary_key.is_empty()
            && !self.cloudinary_secret.is_empty()
    }
}
