//! # Notification Cell
//!
//! Outbound email through the EmailJS REST API.
//!
//! ```text
//! +-----------------------------------------------------+
//! |                 Notification Cell                   |
//! +-----------------------------------------------------+
//! |  handlers.rs     |  POST /send-feedback             |
//! |  router.rs       |  Route definitions               |
//! |  models.rs       |  EmailJS payload & DTOs          |
//! |  error.rs        |  NotificationError               |
//! |  services/       |                                  |
//! |    emailjs.rs    |  EmailJS HTTP client             |
//! |    dispatcher.rs |  Background appointment notices  |
//! +-----------------------------------------------------+
//! ```
//!
//! Appointment notices are fire-and-forget: the dispatcher spawns a task and
//! the scheduling request never waits on, or fails because of, the email.
//!
//! ## Configuration
//!
//! - `EMAILJS_BASE_URL` - API base URL (optional, defaults to production)
//! - `SERVICE_ID`, `USER_ID`, `ACCESS_TOKEN` - EmailJS credentials
//! - `TEMPLATE_ID` - feedback template
//! - `APPOINTMENT_TEMPLATE_ID` - new appointment template

pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::NotificationError;
pub use models::{AppointmentNotice, EmailJsPayload, FeedbackRequest};
pub use router::notification_routes;
pub use services::{EmailJsClient, NotificationDispatcher};
