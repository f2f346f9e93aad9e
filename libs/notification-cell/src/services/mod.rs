pub mod dispatcher;
pub mod emailjs;

pub use dispatcher::NotificationDispatcher;
pub use emailjs::EmailJsClient;
