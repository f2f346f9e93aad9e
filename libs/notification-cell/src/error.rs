use thiserror::Error;

use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Email gateway not configured")]
    NotConfigured,

    #[error("Email gateway request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Email gateway rejected the message: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

impl From<NotificationError> for AppError {
    fn from(e: NotificationError) -> Self {
        AppError::ExternalService(e.to_string())
    }
}
